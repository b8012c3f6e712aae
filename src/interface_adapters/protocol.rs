// Wire protocol DTOs and conversions for the public WebSocket messages.
//
// Positions go out in pixels; everything inside the simulation is meters.

use crate::domain::controls::{ControlState, HeldKeys};
use crate::domain::ObjectSnapshot;
use crate::use_cases::WorldUpdate;
use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};

pub const PIXELS_PER_METER: f32 = 64.0;

/// Per-tick payload sent to one client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldUpdateDto<'a> {
    pub tick: u64,
    // Lets the client tell its own ship apart.
    pub recipient_id: String,
    pub objects: Vec<ObjectDto<'a>>,
}

impl<'a> From<&'a WorldUpdate> for WorldUpdateDto<'a> {
    fn from(update: &'a WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            recipient_id: update.recipient.to_string(),
            objects: update.objects().map(ObjectDto::from).collect(),
        }
    }
}

/// Flattened object state for wire transmission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDto<'a> {
    pub id: String,
    pub kind: &'static str,
    pub x: f32,
    pub y: f32,
    pub sprite: &'a str,
    pub sprite_rect: SpriteRectDto,
    pub flip_h: bool,
    pub flip_v: bool,
    pub flip_d: bool,
    pub angle: f32,
    pub deleted: bool,
}

impl<'a> From<&'a ObjectSnapshot> for ObjectDto<'a> {
    fn from(object: &'a ObjectSnapshot) -> Self {
        let rect = object.sprite.rect;
        Self {
            id: object.id.to_string(),
            kind: object.kind.as_str(),
            x: object.position.x * PIXELS_PER_METER,
            y: object.position.y * PIXELS_PER_METER,
            sprite: &object.sprite.sheet,
            sprite_rect: SpriteRectDto {
                x0: rect.x0,
                y0: rect.y0,
                w: rect.w,
                h: rect.h,
            },
            flip_h: object.sprite.flip_h,
            flip_v: object.sprite.flip_v,
            flip_d: object.sprite.flip_d,
            angle: object.angle,
            deleted: object.deleted,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpriteRectDto {
    pub x0: i32,
    pub y0: i32,
    pub w: i32,
    pub h: i32,
}

/// Key-state message sent by the client whenever its held keys change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyStateDto {
    #[serde(default)]
    pub keys: Vec<String>,
    // One-shot request for the static layer.
    #[serde(default)]
    pub resync: bool,
}

impl KeyStateDto {
    /// Merges this message into the player's stored control state.
    pub fn apply_to(&self, state: &mut ControlState) {
        state.apply(HeldKeys::from_tokens(&self.keys), self.resync);
    }
}

/// Serializes one update into the shared text frame payload.
pub fn encode_world_update(update: &WorldUpdate) -> Result<Utf8Bytes, serde_json::Error> {
    let txt = serde_json::to_string(&WorldUpdateDto::from(update))?;
    Ok(Utf8Bytes::from(txt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behaviors::{Behavior, Turret};
    use crate::domain::tuning::enemy::EnemyTuning;
    use crate::domain::{EntityId, Vec2};
    use serde_json::Value;
    use std::sync::Arc;

    #[test]
    fn when_update_is_encoded_then_wire_fields_are_camel_case_pixels() {
        let tuning = EnemyTuning::default();
        let turret = Turret::new(EntityId::allocate(), Vec2::new(2.0, 0.5), &tuning);
        let snapshot = turret.record().snapshot();
        let recipient = EntityId::allocate();
        let update = WorldUpdate {
            tick: 7,
            recipient,
            shared: Arc::from(vec![snapshot.clone()]),
            static_layer: None,
        };

        let bytes = encode_world_update(&update).expect("serializable");
        let value: Value = serde_json::from_str(bytes.as_str()).expect("valid json");

        assert_eq!(value["tick"], 7);
        assert_eq!(value["recipientId"], recipient.to_string());
        let object = &value["objects"][0];
        assert_eq!(object["id"], snapshot.id.to_string());
        assert_eq!(object["kind"], "turret");
        assert_eq!(object["x"], 128.0);
        assert_eq!(object["y"], 32.0);
        assert_eq!(object["sprite"], "spaceShooterRedux");
        assert_eq!(object["spriteRect"]["x0"], 225);
        assert_eq!(object["spriteRect"]["w"], 98);
        assert_eq!(object["flipV"], true);
        assert_eq!(object["deleted"], false);
    }

    #[test]
    fn when_key_state_omits_fields_then_defaults_apply() {
        let mut controls = ControlState::default();
        let dto: KeyStateDto = serde_json::from_str(r#"{"keys":["W","e","Q"]}"#).expect("valid");
        dto.apply_to(&mut controls);

        assert!(controls.keys.thrust);
        assert!(controls.keys.shoot);
        assert!(!controls.keys.turn_left);
        assert_eq!(controls.resync_requests, 0);

        let dto: KeyStateDto = serde_json::from_str(r#"{"resync":true}"#).expect("valid");
        dto.apply_to(&mut controls);
        assert_eq!(controls.resync_requests, 1);
        assert!(!controls.keys.thrust);
    }

    #[test]
    fn when_message_is_not_a_key_state_then_parsing_fails() {
        assert!(serde_json::from_str::<KeyStateDto>(r#"{"keys":"W"}"#).is_err());
        assert!(serde_json::from_str::<KeyStateDto>("not json").is_err());
    }
}
