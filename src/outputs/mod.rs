//! Writing collection results to disk.
//!
//! Results always go to stdout as JSON; with `--output-dir` they are also
//! written to a dated folder so repeated runs do not overwrite each other:
//!
//! ```text
//! output_dir/
//! └── 2025-05-06/
//!     ├── batch.json
//!     ├── article_18f2c0a1b3d4e5.json
//!     └── feed_18f2c0a1b3d4e6.json
//! ```

pub mod json;
