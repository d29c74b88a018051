//! Spawner service
//!
//! Registers enemy templates and spawns customised clones from them.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{Dragon, Enemy, IdAllocator, Orc, Position, PrototypeRegistry};
use crate::infrastructure::traits::Console;

/// Key of the basic orc template.
pub const ORC_BASIC: &str = "orc-basic";
/// Key of the fire dragon template.
pub const DRAGON_FIRE: &str = "dragon-fire";

/// Attack bonus applied to the dragon of a wave.
const DRAGON_BONUS: u32 = 15;

/// Enemies produced by one wave.
#[derive(Debug, Clone)]
pub struct WaveReport {
    /// Customised clones in spawn order
    pub wave: Vec<Enemy>,
    /// Untouched clones spawned afterwards, one per template
    pub fresh: Vec<Enemy>,
}

/// Service narrating a prototype registry.
pub struct SpawnerService {
    registry: PrototypeRegistry<Enemy>,
    console: Arc<dyn Console>,
}

impl SpawnerService {
    pub fn new(ids: Arc<IdAllocator>, console: Arc<dyn Console>) -> Self {
        Self {
            registry: PrototypeRegistry::new(ids),
            console,
        }
    }

    pub fn registry(&self) -> &PrototypeRegistry<Enemy> {
        &self.registry
    }

    /// Register the `orc-basic` and `dragon-fire` templates.
    pub fn register_defaults(&self) {
        self.registry.register(
            ORC_BASIC,
            Orc::new(120, 15, vec!["Roar".into(), "Charge".into()]).into(),
        );
        self.registry
            .register(DRAGON_FIRE, Dragon::new(350, 40, "Fire").into());
        debug!(keys = ?self.registry.keys(), "registered default templates");
    }

    /// Deterministic placement for the `slot`-th enemy of a wave.
    pub fn formation(slot: usize) -> Position {
        let slot = slot as i32;
        Position::new((slot % 5) * 2 - 4, -(slot / 5))
    }

    /// Spawn `orcs` orcs and one dragon, customise some of them, then spawn
    /// fresh clones to show the templates are unchanged.
    ///
    /// The second orc learns `Berserk`; the dragon is empowered.
    #[instrument(level = "debug", skip(self))]
    pub fn run_wave(&self, orcs: usize) -> ApplicationResult<WaveReport> {
        let mut wave = Vec::with_capacity(orcs + 1);
        for slot in 0..orcs {
            let mut orc = self.registry.spawn(ORC_BASIC, Self::formation(slot))?;
            if slot == 1 {
                if let Some(o) = orc.as_orc_mut() {
                    o.add_ability("Berserk");
                }
            }
            wave.push(orc);
        }

        let mut dragon = self.registry.spawn(DRAGON_FIRE, Position::new(10, 2))?;
        if let Some(d) = dragon.as_dragon_mut() {
            d.empower(DRAGON_BONUS);
        }
        wave.push(dragon);

        let fresh = vec![
            self.registry.spawn(ORC_BASIC, Position::default())?,
            self.registry.spawn(DRAGON_FIRE, Position::default())?,
        ];

        self.console.header("=== Spawned Wave ===");
        for enemy in &wave {
            self.console.line(&enemy.to_string());
        }
        self.console.blank();
        self.console
            .header("=== Fresh clones from unchanged prototypes ===");
        for enemy in &fresh {
            self.console.line(&enemy.to_string());
        }

        Ok(WaveReport { wave, fresh })
    }
}
