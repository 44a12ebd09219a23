// Domain layer: collaboration graph model, traversal and serializers. Ports
// describe what the adapters must provide.

pub mod model;
pub mod names;
pub mod pagination;
pub mod ports;
pub mod ranking;
pub mod scope;
pub mod sunburst;
pub mod traversal;
