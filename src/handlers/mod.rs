// handlers/mod.rs - Route handlers by security tier
//
// public:    no credentials required (token acquisition, health)
// protected: bearer access token required, enforced by extractors or the permission layer

pub mod protected;
pub mod public;
