//! Numbered list of the sites in a state

use std::io::{self, Write};

use super::write_heading;
use crate::data::NationalSite;

/// Renders the sites of a state as a 1-based numbered list
pub fn render(out: &mut impl Write, state_name: &str, sites: &[NationalSite]) -> io::Result<()> {
    write_heading(out, &format!("List of national sites in {}", state_name))?;
    for (i, site) in sites.iter().enumerate() {
        writeln!(out, "[{}] {}", i + 1, site.info())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, zipcode: &str) -> NationalSite {
        NationalSite {
            category: "National Park".to_string(),
            name: name.to_string(),
            address: "Houghton, MI".to_string(),
            zipcode: Some(zipcode.to_string()),
            phone: "(906) 482-0984".to_string(),
        }
    }

    #[test]
    fn test_render_numbers_from_one() {
        let mut out = Vec::new();
        let sites = vec![site("Isle Royale", "49931"), site("Keweenaw", "49930")];

        render(&mut out, "Michigan", &sites).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("List of national sites in Michigan"));
        assert!(text.contains("[1] Isle Royale (National Park): Houghton, MI 49931\n"));
        assert!(text.contains("[2] Keweenaw (National Park): Houghton, MI 49930\n"));
        assert!(!text.contains("[0]"));
    }
}
