// ==========================================
// 订单跟踪对账引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// ==========================================
// 说明: SQLite 仅是数据源 trait 背后的内置替身实现,
//       真实子系统存储可整体替换而不触碰对账逻辑。
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout (毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化四个数据源表 (幂等)
///
/// tags / issues 以 JSON 数组字符串存储; 日期用 ISO-8601 文本。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id          TEXT PRIMARY KEY,
            name              TEXT NOT NULL,
            client            TEXT NOT NULL,
            quantity          INTEGER NOT NULL DEFAULT 0,
            estimated_amount  REAL NOT NULL DEFAULT 0,
            tags              TEXT NOT NULL DEFAULT '[]',
            order_date        TEXT NOT NULL,
            delivery_date     TEXT NOT NULL,
            status            TEXT NOT NULL DEFAULT 'PLANNING',
            priority          TEXT NOT NULL DEFAULT 'LOW',
            progress          REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS process_records (
            process_id          TEXT PRIMARY KEY,
            order_id            TEXT NOT NULL,
            name                TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'PENDING',
            progress            REAL NOT NULL DEFAULT 0,
            assignee            TEXT,
            machine_utilization REAL NOT NULL DEFAULT 0,
            planned_hours       REAL NOT NULL DEFAULT 0,
            actual_hours        REAL NOT NULL DEFAULT 0,
            complexity          TEXT NOT NULL DEFAULT 'LOW',
            created_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_process_order ON process_records(order_id);

        CREATE TABLE IF NOT EXISTS work_hours_records (
            work_hours_id     TEXT PRIMARY KEY,
            order_id          TEXT NOT NULL,
            process_id        TEXT NOT NULL,
            planned_setup     REAL NOT NULL DEFAULT 0,
            planned_machining REAL NOT NULL DEFAULT 0,
            planned_finishing REAL NOT NULL DEFAULT 0,
            planned_total     REAL NOT NULL DEFAULT 0,
            actual_setup      REAL NOT NULL DEFAULT 0,
            actual_machining  REAL NOT NULL DEFAULT 0,
            actual_finishing  REAL NOT NULL DEFAULT 0,
            actual_total      REAL NOT NULL DEFAULT 0,
            efficiency        REAL NOT NULL DEFAULT 0,
            cost_variance     REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_work_hours_order ON work_hours_records(order_id);

        CREATE TABLE IF NOT EXISTS daily_report_records (
            report_id          TEXT PRIMARY KEY,
            order_id           TEXT NOT NULL,
            worker_id          TEXT NOT NULL,
            report_date        TEXT NOT NULL,
            total_minutes      INTEGER NOT NULL DEFAULT 0,
            productivity_score REAL NOT NULL DEFAULT 0,
            issues             TEXT NOT NULL DEFAULT '[]'
        );
        CREATE INDEX IF NOT EXISTS idx_daily_report_order_date
            ON daily_report_records(order_id, report_date);
        "#,
    )?;
    Ok(())
}
