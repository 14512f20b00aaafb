// handlers/mod.rs - two handler tiers
//
// Public (no auth) and Protected (JWT + workspace membership, mounted under
// /api/v1/workspaces/:ws_id).
pub mod protected;
pub mod public;
