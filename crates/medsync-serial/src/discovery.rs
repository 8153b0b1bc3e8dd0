//! Discovery of candidate RFID reader ports.

/// Lists serial ports that look like a USB-attached RFID reader.
///
/// Enumeration failures are treated as "no ports": the caller surfaces
/// that as a device-not-found condition, which reads the same to the
/// operator.
pub fn discover_ports() -> Vec<String> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(err) => {
            tracing::warn!(error = %err, "serial port enumeration failed");
            return Vec::new();
        }
    };

    ports
        .into_iter()
        .map(|p| p.port_name)
        .filter(|name| is_reader_port(name))
        .collect()
}

/// Heuristic for USB CDC devices per platform.
fn is_reader_port(name: &str) -> bool {
    if cfg!(target_os = "windows") {
        name.to_ascii_uppercase().starts_with("COM")
    } else if cfg!(target_os = "macos") {
        name.starts_with("/dev/cu.usbmodem") || name.starts_with("/dev/cu.usbserial")
    } else {
        name.starts_with("/dev/ttyACM") || name.starts_with("/dev/ttyUSB")
    }
}
