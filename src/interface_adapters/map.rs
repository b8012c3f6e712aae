// Tile-map boundary: the decoded JSON map document and its conversion into initial spawns.

use crate::domain::behaviors::{Pickup, ScriptedKind, Tile, TriggerAction};
use crate::domain::{SpawnRequest, Sprite, SpriteRect, Token, Vec2};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Sheet used by tiles that do not name their own.
pub const TILE_SHEET: &str = "arenaTiles";

const WALL_RECT: SpriteRect = SpriteRect::new(0, 0, 64, 64);
const TRIGGER_RECT: SpriteRect = SpriteRect::new(64, 0, 64, 64);

#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    // Trigger action kind other than turret/tracker.
    UnknownTriggerKind(String),
    // Pickup payload that does not name a mailbox token.
    UnknownPayload(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(e) => write!(f, "failed to read map: {e}"),
            MapError::Parse(e) => write!(f, "failed to parse map: {e}"),
            MapError::UnknownTriggerKind(kind) => write!(f, "unknown trigger kind {kind:?}"),
            MapError::UnknownPayload(payload) => write!(f, "unknown pickup payload {payload:?}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e)
    }
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::Parse(e)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileMap {
    #[serde(default)]
    pub tiles: Vec<TileDto>,
    #[serde(default)]
    pub pickups: Vec<PickupDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileDto {
    // Zero marks an empty cell.
    pub id: u32,
    pub row: u32,
    pub col: u32,
    #[serde(default)]
    pub sprite: Option<String>,
    pub sprite_rect: SpriteRectDto,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
    #[serde(default)]
    pub flip_d: bool,
    #[serde(default)]
    pub trigger: Option<Vec<TriggerDto>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpriteRectDto {
    pub x0: i32,
    pub y0: i32,
    pub w: i32,
    pub h: i32,
}

/// Scripted spawn; `x`/`y` are meters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDto {
    pub kind: String,
    #[serde(default)]
    pub delay_ms: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupDto {
    pub x: f32,
    pub y: f32,
    pub payload: String,
}

impl TileMap {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Built-in arena: a walled 16x12 room, one trigger tile and one bomb pickup.
    pub fn default_arena() -> Self {
        const COLS: u32 = 16;
        const ROWS: u32 = 12;

        let mut tiles = Vec::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                let edge = row == 0 || col == 0 || row == ROWS - 1 || col == COLS - 1;
                if edge {
                    tiles.push(TileDto::plain(row, col, WALL_RECT));
                }
            }
        }

        let mut trigger = TileDto::plain(9, 3, TRIGGER_RECT);
        trigger.trigger = Some(vec![
            TriggerDto {
                kind: "turret".to_string(),
                delay_ms: 0,
                x: 12.0,
                y: 3.0,
            },
            TriggerDto {
                kind: "tracker".to_string(),
                delay_ms: 1000,
                x: 12.0,
                y: 8.0,
            },
        ]);
        tiles.push(trigger);

        Self {
            tiles,
            pickups: vec![PickupDto {
                x: 7.0,
                y: 7.0,
                payload: Token::BombPlus.as_str().to_string(),
            }],
        }
    }

    /// Converts the map into spawn requests for the initial world.
    pub fn into_spawns(self) -> Result<Vec<SpawnRequest>, MapError> {
        let mut spawns = Vec::with_capacity(self.tiles.len() + self.pickups.len());

        for dto in self.tiles.into_iter().filter(|t| t.id != 0) {
            let position = Vec2::new(dto.col as f32 + 0.5, dto.row as f32 + 0.5);
            let sheet = dto.sprite.as_deref().unwrap_or(TILE_SHEET);
            let rect = dto.sprite_rect;
            let sprite = Sprite::new(sheet, SpriteRect::new(rect.x0, rect.y0, rect.w, rect.h))
                .flipped(dto.flip_h, dto.flip_v, dto.flip_d);

            let actions = dto
                .trigger
                .unwrap_or_default()
                .into_iter()
                .map(TriggerDto::into_action)
                .collect::<Result<Vec<_>, _>>()?;

            let tile = Tile::new(position, sprite).with_trigger(actions);
            let body = tile.body_desc();
            spawns.push(SpawnRequest::new(tile, body));
        }

        for dto in self.pickups {
            let payload =
                Token::parse(&dto.payload).ok_or(MapError::UnknownPayload(dto.payload))?;
            let pickup = Pickup::new(Vec2::new(dto.x, dto.y), payload);
            let body = pickup.body_desc();
            spawns.push(SpawnRequest::new(pickup, body));
        }

        Ok(spawns)
    }
}

impl TileDto {
    fn plain(row: u32, col: u32, rect: SpriteRect) -> Self {
        Self {
            id: 1,
            row,
            col,
            sprite: None,
            sprite_rect: SpriteRectDto {
                x0: rect.x0,
                y0: rect.y0,
                w: rect.w,
                h: rect.h,
            },
            flip_h: false,
            flip_v: false,
            flip_d: false,
            trigger: None,
        }
    }
}

impl TriggerDto {
    fn into_action(self) -> Result<TriggerAction, MapError> {
        let kind = ScriptedKind::parse(&self.kind).ok_or(MapError::UnknownTriggerKind(self.kind))?;
        Ok(TriggerAction {
            kind,
            delay: Duration::from_millis(self.delay_ms),
            position: Vec2::new(self.x, self.y),
        })
    }
}
