use serde::{Deserialize, Serialize};
use super::ObjectId;

/// One category of master data to replicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    pub id: ObjectId,
    pub name: String,
    pub volume: u64,                  // Total number of records
    pub packet_size: u64,             // Records per source request
    pub payload_size_per_record_kb: f64,
}

impl DataObject {
    pub fn new(
        id: impl Into<ObjectId>,
        name: impl Into<String>,
        volume: u64,
        packet_size: u64,
        payload_size_per_record_kb: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volume,
            packet_size,
            payload_size_per_record_kb,
        }
    }

    /// Packet size usable as a divisor (never below one record)
    pub fn safe_packet_size(&self) -> u64 {
        self.packet_size.max(1)
    }

    /// Number of source requests needed to send the whole volume once
    pub fn total_packets(&self) -> u64 {
        self.volume.div_ceil(self.safe_packet_size())
    }

    /// Payload carried by a single source request
    pub fn payload_per_packet_kb(&self) -> f64 {
        self.packet_size as f64 * self.payload_size_per_record_kb
    }

    pub fn total_data_mb(&self) -> f64 {
        self.volume as f64 * self.payload_size_per_record_kb / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_packets_rounds_up() {
        let object = DataObject::new("1", "Customer Master", 1001, 100, 1.5);
        assert_eq!(object.total_packets(), 11);
    }

    #[test]
    fn test_zero_packet_size_is_floored() {
        let object = DataObject::new("1", "Broken", 10, 0, 1.0);
        assert_eq!(object.safe_packet_size(), 1);
        assert_eq!(object.total_packets(), 10);
    }

    #[test]
    fn test_payload_figures() {
        let object = DataObject::new("2", "Material Master", 1024, 200, 2.0);
        assert_eq!(object.payload_per_packet_kb(), 400.0);
        assert_eq!(object.total_data_mb(), 2.0);
    }
}
