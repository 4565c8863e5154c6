//! Capture device enumeration
//!
//! Devices are gathered from every available audio host (ALSA, JACK,
//! PulseAudio...) so that a USB microphone is found whichever backend
//! happens to own it.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::HostId;

use super::error::{AudioError, AudioResult};

/// Get a human-readable name for a host ID
fn host_name(host_id: HostId) -> String {
    let name = format!("{:?}", host_id);
    match name.as_str() {
        "Alsa" => "ALSA".to_string(),
        "Jack" => "JACK".to_string(),
        "Wasapi" => "WASAPI".to_string(),
        _ => name,
    }
}

/// Information about an audio capture device
#[derive(Debug, Clone, PartialEq)]
pub struct InputDevice {
    /// Device identifier, also what the user passes on the command line
    pub name: String,
    /// Host backend name (e.g., "ALSA", "JACK")
    pub host: String,
    /// Whether this is the system default input for its host
    pub is_default: bool,
    /// Maximum input channels
    pub max_channels: u16,
}

/// Get all audio capture devices from ALL hosts
///
/// Default devices come first, then by host and name. Devices whose
/// configuration cannot be queried are skipped.
pub fn get_input_devices() -> AudioResult<Vec<InputDevice>> {
    let mut all_devices: Vec<InputDevice> = Vec::new();

    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not initialize host {:?}: {}", host_id, e);
                continue;
            }
        };
        let host_name_str = host_name(host_id);

        let default_device_name = host
            .default_input_device()
            .and_then(|d: cpal::Device| d.name().ok());

        let devices_iter = match host.input_devices() {
            Ok(d) => d,
            Err(e) => {
                log::debug!("Could not enumerate inputs for {:?}: {}", host_id, e);
                continue;
            }
        };

        for device in devices_iter {
            let Ok(name) = device.name() else {
                continue;
            };
            let max_channels = match device.supported_input_configs() {
                Ok(configs) => configs.map(|c| c.channels()).max().unwrap_or(0),
                Err(_) => continue,
            };
            if max_channels == 0 {
                continue;
            }

            all_devices.push(InputDevice {
                is_default: default_device_name.as_ref() == Some(&name),
                name,
                host: host_name_str.clone(),
                max_channels,
            });
        }
    }

    if all_devices.is_empty() {
        return Err(AudioError::NoDevices);
    }

    sort_devices(&mut all_devices);
    log::debug!("Enumerated {} capture devices", all_devices.len());
    Ok(all_devices)
}

fn sort_devices(devices: &mut [InputDevice]) {
    devices.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.host.cmp(&b.host))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Identifiers of every capture device, in probe order, without duplicates
///
/// Enumeration failures are logged and yield an empty list.
pub fn input_device_names() -> Vec<String> {
    match get_input_devices() {
        Ok(devices) => unique_names(&devices),
        Err(e) => {
            log::warn!("{}", e);
            Vec::new()
        }
    }
}

fn unique_names(devices: &[InputDevice]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(devices.len());
    for device in devices {
        if !names.contains(&device.name) {
            names.push(device.name.clone());
        }
    }
    names
}

/// Find a capture device by name, searching the default host first
pub fn find_input_device(name: &str) -> AudioResult<cpal::Device> {
    let default_id = cpal::default_host().id();
    let mut host_ids = cpal::available_hosts();
    host_ids.sort_by_key(|id| *id != default_id);

    for host_id in host_ids {
        let Ok(host) = cpal::host_from_id(host_id) else {
            continue;
        };
        let Ok(mut devices) = host.input_devices() else {
            continue;
        };
        if let Some(device) = devices.find(|d: &cpal::Device| d.name().ok().as_deref() == Some(name)) {
            log::debug!("Found capture device '{}' on {}", name, host_name(host_id));
            return Ok(device);
        }
    }

    Err(AudioError::DeviceNotFound(name.to_string()))
}

/// Try `open` on each candidate in order and keep the first that succeeds
///
/// Failures are logged and the next candidate is tried. Returns the winning
/// identifier with whatever `open` produced.
pub fn probe_devices<T, F>(candidates: &[String], mut open: F) -> Option<(String, T)>
where
    F: FnMut(&str) -> AudioResult<T>,
{
    for name in candidates {
        match open(name) {
            Ok(opened) => return Some((name.clone(), opened)),
            Err(e) => log::debug!("Skipping capture device '{}': {}", name, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, host: &str, is_default: bool) -> InputDevice {
        InputDevice {
            name: name.to_string(),
            host: host.to_string(),
            is_default,
            max_channels: 1,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_host_name_display() {
        assert_eq!(host_name(HostId::Alsa), "ALSA");
    }

    #[test]
    fn test_default_devices_sort_first() {
        let mut devices = vec![
            device("usb", "ALSA", false),
            device("pipewire", "ALSA", true),
            device("default", "JACK", false),
        ];
        sort_devices(&mut devices);
        let order: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(order, ["pipewire", "usb", "default"]);
    }

    #[test]
    fn test_unique_names_keeps_first_occurrence() {
        let devices = vec![
            device("default", "ALSA", true),
            device("usb", "ALSA", false),
            device("default", "JACK", false),
        ];
        assert_eq!(unique_names(&devices), names(&["default", "usb"]));
    }

    #[test]
    fn test_probe_picks_first_that_opens() {
        let candidates = names(&["hdmi", "usb", "default"]);
        let mut tried = Vec::new();
        let result = probe_devices(&candidates, |name| {
            tried.push(name.to_string());
            if name == "hdmi" {
                Err(AudioError::UnsupportedFormat("no capture".to_string()))
            } else {
                Ok(name.len())
            }
        });

        assert_eq!(result, Some(("usb".to_string(), 3)));
        assert_eq!(tried, names(&["hdmi", "usb"]));
    }

    #[test]
    fn test_probe_exhausted() {
        let candidates = names(&["a", "b"]);
        let result: Option<(String, ())> =
            probe_devices(&candidates, |name| Err(AudioError::DeviceNotFound(name.to_string())));
        assert!(result.is_none());
    }

    #[test]
    fn test_probe_without_candidates() {
        let result: Option<(String, ())> = probe_devices(&[], |_| Ok(()));
        assert!(result.is_none());
    }
}
