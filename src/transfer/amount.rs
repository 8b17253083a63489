//! SOL / lamport conversion

use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Convert SOL to lamports, truncating any fraction of a lamport
pub fn sol_to_lamports(sol: f64) -> u64 {
    // `as` saturates: negative and NaN inputs become 0
    (sol * LAMPORTS_PER_SOL as f64).floor() as u64
}

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
