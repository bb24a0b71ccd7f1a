//! Application package inspection for altsource
//!
//! Reads an `.ipa` archive (a zip container with a single `Payload/<Name>.app/`
//! bundle) and extracts the pieces of distribution metadata a source catalog
//! needs: the highest resolution app icon, the entitlement names, and the
//! privacy usage descriptions declared in `Info.plist`.
//!
//! ## Usage
//!
//! ```ignore
//! use altsource_package::inspect_package;
//!
//! let bytes = std::fs::read("MyApp.ipa")?;
//! let metadata = inspect_package(&bytes, "MyApp")?;
//! println!("{} entitlements", metadata.entitlements.len());
//! ```

pub mod error;
pub mod icon;
pub mod inspector;

pub use error::{PackageError, Result};
pub use icon::{icon_scale, IconImage};
pub use inspector::{inspect_package, inspect_package_file, PackageMetadata};
