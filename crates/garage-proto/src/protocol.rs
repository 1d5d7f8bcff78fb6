use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GarageSnapshot, Vehicle};

/// Messages pushed from the host process to the panel.
///
/// Every push is a JSON object tagged by a `type` discriminator.  This enum
/// is the closed union of the kinds the panel understands; frames carrying
/// any other discriminator are deliberately passed through undecoded (the
/// bridge drops them without invoking a handler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostPush {
    /// Full snapshot; opens the panel and replaces all prior state.
    #[serde(rename = "openUI")]
    OpenUi(GarageSnapshot),
    /// Host-driven close; no payload beyond the discriminator.
    #[serde(rename = "closeUI")]
    CloseUi,
    /// Vehicle-only delta; players/config are left untouched.
    #[serde(rename = "updateVehicles")]
    UpdateVehicles { vehicles: Vec<Vehicle> },
}

impl HostPush {
    pub fn kind(&self) -> &'static str {
        match self {
            HostPush::OpenUi(_) => "openUI",
            HostPush::CloseUi => "closeUI",
            HostPush::UpdateVehicles { .. } => "updateVehicles",
        }
    }

    /// Serialize into a length-prefixed frame for the push socket.
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        encode_frame(&serde_json::to_value(self)?)
    }
}

/// Commands sent from the panel to the host, addressed by name.
///
/// The wire form is `POST /:name` with the payload as JSON body; the
/// response body is a host-owned contract the panel does not validate.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CloseUi,
    DriveVehicle { vehicle_id: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CloseUi => "closeUI",
            Command::DriveVehicle { .. } => "driveVehicle",
        }
    }

    pub fn payload(&self) -> Option<Value> {
        match self {
            Command::CloseUi => None,
            Command::DriveVehicle { vehicle_id } => {
                Some(serde_json::json!({ "vehicleId": vehicle_id }))
            }
        }
    }
}

/// Frame an arbitrary JSON value with a u32 big-endian length prefix.
pub fn encode_frame(value: &Value) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let len = json.len() as u32;
    let mut result = Vec::with_capacity(4 + json.len());
    result.extend_from_slice(&len.to_be_bytes());
    result.extend_from_slice(&json);
    Ok(result)
}

/// Total size (header included) of the first frame in `data`, or `None`
/// when the buffer holds less than a full frame and the caller should keep
/// accumulating.
pub fn frame_len(data: &[u8]) -> Option<usize> {
    if data.len() < 4 {
        return None;
    }
    let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < 4 + len {
        None
    } else {
        Some(4 + len)
    }
}

/// Decode one frame from the front of `data`.  Returns the JSON value and
/// the number of bytes consumed; errors when the buffer holds less than a
/// full frame or the body is not valid JSON.
pub fn decode_frame(data: &[u8]) -> anyhow::Result<(Value, usize)> {
    let Some(total) = frame_len(data) else {
        anyhow::bail!("Insufficient data for frame");
    };
    let value: Value = serde_json::from_slice(&data[4..total])?;
    Ok((value, total))
}

/// Split an inbound envelope into its discriminator and payload: removes the
/// `type` field and returns (kind, remainder).  `None` when the envelope is
/// not an object or carries no string discriminator.
pub fn split_kind(value: Value) -> Option<(String, Value)> {
    let Value::Object(mut map) = value else {
        return None;
    };
    let kind = match map.remove("type") {
        Some(Value::String(s)) => s,
        _ => return None,
    };
    Some((kind, Value::Object(map)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehicleStatus;

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            name: "Sultan".to_string(),
            plate: "ABC123".to_string(),
            status: VehicleStatus::Garaged,
            ..Vehicle::default()
        }
    }

    #[test]
    fn test_push_frame_round_trip() {
        let push = HostPush::UpdateVehicles {
            vehicles: vec![vehicle("v1"), vehicle("v2")],
        };
        let encoded = push.encode().unwrap();
        let (value, consumed) = decode_frame(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        let decoded: HostPush = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, push);
    }

    #[test]
    fn test_close_push_is_bare_discriminator() {
        let value = serde_json::to_value(&HostPush::CloseUi).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "closeUI" }));
    }

    #[test]
    fn test_split_kind_strips_discriminator() {
        let value = serde_json::json!({
            "type": "updateVehicles",
            "vehicles": []
        });
        let (kind, payload) = split_kind(value).unwrap();
        assert_eq!(kind, "updateVehicles");
        assert_eq!(payload, serde_json::json!({ "vehicles": [] }));
    }

    #[test]
    fn test_split_kind_rejects_untagged_envelopes() {
        assert!(split_kind(serde_json::json!({ "vehicles": [] })).is_none());
        assert!(split_kind(serde_json::json!([1, 2, 3])).is_none());
        assert!(split_kind(serde_json::json!({ "type": 7 })).is_none());
    }

    #[test]
    fn test_decode_frame_short_buffer() {
        let encoded = HostPush::CloseUi.encode().unwrap();
        assert!(decode_frame(&encoded[..2]).is_err());
        assert!(decode_frame(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn test_drive_command_payload() {
        let cmd = Command::DriveVehicle {
            vehicle_id: "veh_9".to_string(),
        };
        assert_eq!(cmd.name(), "driveVehicle");
        assert_eq!(
            cmd.payload().unwrap(),
            serde_json::json!({ "vehicleId": "veh_9" })
        );
        assert_eq!(Command::CloseUi.payload(), None);
    }
}
