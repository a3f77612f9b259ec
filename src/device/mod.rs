//! Mocked Bluetooth pairing and device status. No real I/O: scanning and
//! connecting are fixed-delay simulations over a hard-coded device list.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{bail, Result};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaterLevel {
    Low,
    Normal,
    High,
}

impl WaterLevel {
    /// Indicator text on the status strip.
    pub fn label(&self) -> &'static str {
        match self {
            WaterLevel::Low => "LOW",
            WaterLevel::Normal => "OK",
            WaterLevel::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChamberType {
    Multi,
    Single,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AccessoryKind {
    Arm,
    SingleLeg,
    DoubleLegs,
    Vest,
    LowerBack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    pub id: String,
    pub name: String,
    pub chamber_type: ChamberType,
    pub chambers: u8,
    pub kind: AccessoryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub serial_number: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub water_level: WaterLevel,
    pub tank_temp_c: i32,
    pub accessories: Vec<Accessory>,
}

impl DeviceStatus {
    pub fn has_multi_chamber(&self) -> bool {
        self.accessories
            .iter()
            .any(|accessory| accessory.chamber_type == ChamberType::Multi)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ConnectionState {
    Disconnected,
    Scanning,
    Connected { device: Device },
}

fn discoverable_devices() -> Vec<Device> {
    ["SN001234", "SN005678", "SN009012"]
        .iter()
        .enumerate()
        .map(|(index, serial)| Device {
            id: (index + 1).to_string(),
            name: "3Covery".to_string(),
            serial_number: serial.to_string(),
        })
        .collect()
}

fn connected_accessories() -> Vec<Accessory> {
    vec![Accessory {
        id: "3".to_string(),
        name: "Double Legs".to_string(),
        chamber_type: ChamberType::Multi,
        chambers: 4,
        kind: AccessoryKind::DoubleLegs,
    }]
}

/// Owner of the simulated device link.
#[derive(Clone)]
pub struct DeviceManager {
    link: Arc<Mutex<ConnectionState>>,
    scan_delay: Duration,
    connect_delay: Duration,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceManager {
    pub fn new() -> Self {
        Self {
            link: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            scan_delay: Duration::from_secs(3),
            connect_delay: Duration::from_millis(800),
        }
    }

    /// Shorten the simulated radio delays for tests and demos.
    pub fn with_delays(mut self, scan: Duration, connect: Duration) -> Self {
        self.scan_delay = scan;
        self.connect_delay = connect;
        self
    }

    pub fn connection(&self) -> ConnectionState {
        self.link.lock().unwrap().clone()
    }

    pub fn connected_device(&self) -> Option<Device> {
        match &*self.link.lock().unwrap() {
            ConnectionState::Connected { device } => Some(device.clone()),
            _ => None,
        }
    }

    /// Look for nearby devices. Takes roughly `scan_delay` (with a little
    /// jitter) and always finds the same three units.
    pub async fn scan(&self) -> Result<Vec<Device>> {
        {
            let mut link = self.link.lock().unwrap();
            if *link == ConnectionState::Scanning {
                bail!("scan already in progress");
            }
            *link = ConnectionState::Scanning;
        }

        let jitter_ms = {
            let max_jitter = (self.scan_delay.as_millis() as u64 / 10).max(1);
            rand::thread_rng().gen_range(0..max_jitter)
        };
        sleep(self.scan_delay + Duration::from_millis(jitter_ms)).await;

        *self.link.lock().unwrap() = ConnectionState::Disconnected;
        let devices = discoverable_devices();
        info!("scan finished: {} device(s) found", devices.len());
        Ok(devices)
    }

    pub async fn connect(&self, device_id: &str) -> Result<Device> {
        let device = match discoverable_devices()
            .into_iter()
            .find(|device| device.id == device_id)
        {
            Some(device) => device,
            None => bail!("unknown device '{device_id}'"),
        };

        if self.connection() == ConnectionState::Scanning {
            bail!("cannot connect while a scan is in progress");
        }

        sleep(self.connect_delay).await;
        *self.link.lock().unwrap() = ConnectionState::Connected {
            device: device.clone(),
        };
        info!("connected to {} {}", device.name, device.serial_number);
        Ok(device)
    }

    pub fn disconnect(&self) {
        *self.link.lock().unwrap() = ConnectionState::Disconnected;
    }

    /// Current device telemetry. The tank temperature wanders a degree to
    /// feel alive; everything else is fixed mock data.
    pub fn status(&self) -> Result<DeviceStatus> {
        if self.connected_device().is_none() {
            bail!("no device connected");
        }

        let jitter: i32 = rand::thread_rng().gen_range(-1..=1);
        Ok(DeviceStatus {
            water_level: WaterLevel::Normal,
            tank_temp_c: 22 + jitter,
            accessories: connected_accessories(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> DeviceManager {
        DeviceManager::new().with_delays(Duration::from_millis(5), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn scan_finds_the_three_mock_devices() {
        let manager = manager();
        let devices = manager.scan().await.unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].serial_number, "SN001234");
        assert!(devices.iter().all(|device| device.name == "3Covery"));
        assert_eq!(manager.connection(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn connect_then_status() {
        let manager = manager();
        let devices = manager.scan().await.unwrap();
        let device = manager.connect(&devices[0].id).await.unwrap();
        assert_eq!(device.serial_number, "SN001234");
        assert_eq!(manager.connected_device().unwrap().id, device.id);

        let status = manager.status().unwrap();
        assert_eq!(status.water_level, WaterLevel::Normal);
        assert_eq!(status.water_level.label(), "OK");
        assert!((21..=23).contains(&status.tank_temp_c));
        assert!(status.has_multi_chamber());

        manager.disconnect();
        assert!(manager.status().is_err());
    }

    #[tokio::test]
    async fn status_requires_a_connection() {
        let manager = manager();
        assert!(manager.status().is_err());
    }

    #[tokio::test]
    async fn connect_rejects_unknown_ids() {
        let manager = manager();
        assert!(manager.connect("99").await.is_err());
    }

    #[tokio::test]
    async fn concurrent_scans_are_rejected() {
        let manager = DeviceManager::new()
            .with_delays(Duration::from_millis(50), Duration::from_millis(1));
        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.scan().await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(manager.scan().await.is_err());
        assert!(first.await.unwrap().is_ok());
    }
}
