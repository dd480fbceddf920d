use super::*;

#[test]
fn macros_work_in_expression_position() {
    // Nothing is initialised in tests, so every write is a silent no-op.
    for level in 0..3 {
        let () = match level {
            0 => crate::log_info!("info {}", level),
            1 => crate::log_warn!("warn {}", level),
            _ => crate::log_err!("error {}", level),
        };
    }
}

#[test]
fn write_before_init_is_a_noop() {
    assert!(LOG_FILE.get().is_none());
    write("INFO", "dropped");
}

#[test]
fn timestamp_is_clock_shaped() {
    let ts = timestamp();
    assert_eq!(ts.len(), 8);
    assert_eq!(&ts[2..3], ":");
    assert_eq!(&ts[5..6], ":");
}
