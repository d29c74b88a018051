//! Enemy prototypes for the spawner.

use std::fmt;

use itertools::Itertools;

use crate::domain::prototype::{EntityId, Position, Prototype};

/// Behaviour settings owned by each enemy.
///
/// Held behind a `Box` so that cloning an enemy exercises a deep copy of an
/// owned sub-object rather than a plain field copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brain {
    pub ai_level: u8,
    pub behavior: String,
}

impl Brain {
    pub fn new(ai_level: u8, behavior: impl Into<String>) -> Self {
        Self {
            ai_level,
            behavior: behavior.into(),
        }
    }
}

impl fmt::Display for Brain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AI(lv={},{})", self.ai_level, self.behavior)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orc {
    hp: u32,
    atk: u32,
    abilities: Vec<String>,
    brain: Box<Brain>,
}

impl Default for Orc {
    fn default() -> Self {
        Self::new(100, 12, vec!["Roar".into()])
    }
}

impl Orc {
    pub fn new(hp: u32, atk: u32, abilities: Vec<String>) -> Self {
        Self {
            hp,
            atk,
            abilities,
            brain: Box::new(Brain::new(1, "Aggressive")),
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn atk(&self) -> u32 {
        self.atk
    }

    pub fn abilities(&self) -> &[String] {
        &self.abilities
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn add_ability(&mut self, ability: impl Into<String>) {
        self.abilities.push(ability.into());
    }

    pub fn set_ai(&mut self, level: u8, behavior: impl Into<String>) {
        self.brain.ai_level = level;
        self.brain.behavior = behavior.into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dragon {
    hp: u32,
    atk: u32,
    element: String,
    brain: Box<Brain>,
}

impl Default for Dragon {
    fn default() -> Self {
        Self::new(300, 35, "Fire")
    }
}

impl Dragon {
    pub fn new(hp: u32, atk: u32, element: impl Into<String>) -> Self {
        Self {
            hp,
            atk,
            element: element.into(),
            brain: Box::new(Brain::new(3, "Territorial")),
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn atk(&self) -> u32 {
        self.atk
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Raise attack by `bonus`, saturating at `u32::MAX`.
    pub fn empower(&mut self, bonus: u32) {
        self.atk = self.atk.saturating_add(bonus);
    }

    pub fn set_element(&mut self, element: impl Into<String>) {
        self.element = element.into();
    }

    pub fn set_ai(&mut self, level: u8, behavior: impl Into<String>) {
        self.brain.ai_level = level;
        self.brain.behavior = behavior.into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyKind {
    Orc(Orc),
    Dragon(Dragon),
}

/// A placeable enemy. Unplaced templates carry id `#0` at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    id: EntityId,
    position: Position,
    kind: EnemyKind,
}

impl From<Orc> for Enemy {
    fn from(orc: Orc) -> Self {
        Self::unplaced(EnemyKind::Orc(orc))
    }
}

impl From<Dragon> for Enemy {
    fn from(dragon: Dragon) -> Self {
        Self::unplaced(EnemyKind::Dragon(dragon))
    }
}

impl Enemy {
    fn unplaced(kind: EnemyKind) -> Self {
        Self {
            id: EntityId::default(),
            position: Position::default(),
            kind,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    pub fn brain(&self) -> &Brain {
        match &self.kind {
            EnemyKind::Orc(orc) => orc.brain(),
            EnemyKind::Dragon(dragon) => dragon.brain(),
        }
    }

    pub fn set_ai(&mut self, level: u8, behavior: impl Into<String>) {
        match &mut self.kind {
            EnemyKind::Orc(orc) => orc.set_ai(level, behavior),
            EnemyKind::Dragon(dragon) => dragon.set_ai(level, behavior),
        }
    }

    pub fn as_orc_mut(&mut self) -> Option<&mut Orc> {
        match &mut self.kind {
            EnemyKind::Orc(orc) => Some(orc),
            EnemyKind::Dragon(_) => None,
        }
    }

    pub fn as_dragon_mut(&mut self) -> Option<&mut Dragon> {
        match &mut self.kind {
            EnemyKind::Dragon(dragon) => Some(dragon),
            EnemyKind::Orc(_) => None,
        }
    }
}

impl Prototype for Enemy {
    fn place(&mut self, id: EntityId, at: Position) {
        self.id = id;
        self.position = at;
    }
}

impl fmt::Display for Enemy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EnemyKind::Orc(orc) => write!(
                f,
                "Orc  {} {} HP={} ATK={} {} Abil=[{}]",
                self.id,
                self.position,
                orc.hp,
                orc.atk,
                orc.brain,
                orc.abilities.iter().join(",")
            ),
            EnemyKind::Dragon(dragon) => write!(
                f,
                "Dragon{} {} HP={} ATK={} Elem={} {}",
                self.id, self.position, dragon.hp, dragon.atk, dragon.element, dragon.brain
            ),
        }
    }
}
