//! Places found near a selected site

use std::io::{self, Write};

use super::write_heading;
use crate::data::{NationalSite, NearbyPlace};

/// Renders the places near `site` as a bulleted list
pub fn render(out: &mut impl Write, site: &NationalSite, places: &[NearbyPlace]) -> io::Result<()> {
    write_heading(out, &format!("Places near {}", site.name))?;
    if places.is_empty() {
        writeln!(out, "No places found nearby.")?;
    }
    for place in places {
        writeln!(out, "- {}", place.info())?;
    }
    Ok(())
}
