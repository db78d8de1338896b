//! Crate for reading, writing and transforming mapping trees: hierarchical
//! records that carry names for classes, methods, fields and parameters
//! across several namespaces, as used by bytecode-remapping pipelines.
//!
//! Supported formats are the hierarchical "tiny" format (with auto-detection
//! of the legacy `v1` flat variant), see [`tiny_v2`], and the flat tsrg2
//! format, see [`tsrg2`].
//!
//! The tree itself lives in [`tree::mappings::MappingTree`]. On top of it:
//! descriptor remapping between namespaces ([`remapper`]), namespace
//! reordering and removal ([`tree::mappings::MappingTree::reorder`],
//! [`tree::mappings::MappingTree::remove_namespaces`]), and an engine for
//! ordered, fingerprinted edit pipelines ([`transform`]).

mod action;

pub mod remapper;
pub mod tiny_v2;
pub mod transform;
pub mod tree;
pub mod tsrg2;
