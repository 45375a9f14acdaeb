//! Balance simulator for the cookie economy.
//! Run with: cargo test -p cookies-web simulate_greedy -- --nocapture
