use std::fs::OpenOptions;
use std::io::Write;

use env_logger::{Builder, Env, Target};

use crate::config::LOG_PATH;

/// Routes `log` output to a file; the terminal belongs to the table.
pub fn init() {
    let file = match OpenOptions::new().create(true).append(true).open(LOG_PATH) {
        Ok(file) => file,
        // Without a log file we stay silent rather than scribble over the UI
        Err(_) => return,
    };

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}: {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
