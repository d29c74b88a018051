//! Domain layer: the object-graph components
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod chain;
pub mod composite;
pub mod enemy;
pub mod error;
pub mod prototype;

pub use chain::{Approver, ChainLink, Handler, Outcome, Request, Resolution, Verdict};
pub use composite::{Group, Leaf, Node, RenderLines, DEFAULT_INDENT_STEP, MAX_INDENT_STEP};
pub use enemy::{Brain, Dragon, Enemy, EnemyKind, Orc};
pub use error::{DomainError, DomainResult};
pub use prototype::{EntityId, IdAllocator, Position, Prototype, PrototypeRegistry};
