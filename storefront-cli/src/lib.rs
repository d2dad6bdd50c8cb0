//! # storefront-cli
//!
//! Drives a storefront session from a terminal. The `storefront` binary
//! loads `storefront.yaml` (plus the profile overlay and `STOREFRONT_*`
//! environment variables), connects to the configured service and runs one
//! command:
//!
//! | Command | Description |
//! |---------|-------------|
//! | `storefront products` | List the catalog |
//! | `storefront search <text>` | Run one debounced search |
//! | `storefront cart` | Show the cart and its totals |
//! | `storefront add <id> [--qty N]` | Add a product that is not in the cart yet |
//! | `storefront inc <id>` / `dec <id>` | Step a cart line's quantity |
//! | `storefront checkout` | Show the order summary |
//! | `storefront register <user> --password <p> --confirm <p>` | Create an account |
//!
//! Commands return the text to print; `main` owns stdout and the exit code.

pub mod commands;
