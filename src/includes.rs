//! Include resolution via the compiler's dependency-listing mode (`-E -M`).
//!
//! The listing is make syntax:
//!
//! ```make
//! main.o: main.cpp util.h /usr/include/c++/9/cmath \
//!   /usr/include/math.h
//! ```
//!
//! It is read as a flat token stream. Continuation backslashes, the make
//! target (`main.o:`) and the source files themselves are dropped; what is
//! left is every file the unit includes, directly or not, in the order the
//! compiler reported them.

use crate::error::Result;
use crate::toolchain::Toolchain;
use crate::utils;
use std::path::Path;

/// Extension of the make target token the listing starts with.
const TARGET_TERMINATOR: &str = ".o:";

/// Parse dependency-listing output into the raw include list.
pub fn parse_dependency_listing(output: &str, source_extensions: &[String]) -> Vec<String> {
    output
        .split_whitespace()
        .filter(|token| *token != "\\")
        .filter(|token| {
            let ext = utils::extension(token);
            ext != TARGET_TERMINATOR && !source_extensions.iter().any(|e| e == ext)
        })
        .map(utils::normalize_path)
        .collect()
}

/// Ask the toolchain for everything `unit` includes.
pub fn resolve_includes(
    toolchain: &dyn Toolchain,
    unit: &str,
    source_extensions: &[String],
) -> Result<Vec<String>> {
    let listing = toolchain.list_dependencies(Path::new(unit))?;
    Ok(parse_dependency_listing(&listing, source_extensions))
}
