/// Best-effort desktop notification for a countdown that ran out. Failures
/// are logged and otherwise ignored.
#[cfg(target_os = "linux")]
pub fn finished(name: Option<&str>) {
    let result = notify_rust::Notification::new()
        .appname("tock")
        .summary(name.unwrap_or("Timer"))
        .body("Timer finished!")
        .show();
    if let Err(e) = result {
        log::debug!("notification failed: {e}");
    }
}

#[cfg(not(target_os = "linux"))]
pub fn finished(_name: Option<&str>) {}
