//! Airport catalog for the from/to pickers.

use crate::models::Airport;

const fn airport(
    code: &'static str,
    name: &'static str,
    city: &'static str,
    country: &'static str,
) -> Airport {
    Airport {
        code,
        name,
        city,
        country,
    }
}

pub static AIRPORTS: [Airport; 15] = [
    airport("JFK", "John F. Kennedy International", "New York", "USA"),
    airport("LAX", "Los Angeles International", "Los Angeles", "USA"),
    airport("LHR", "Heathrow Airport", "London", "UK"),
    airport("CDG", "Charles de Gaulle", "Paris", "France"),
    airport("DXB", "Dubai International", "Dubai", "UAE"),
    airport("SIN", "Changi Airport", "Singapore", "Singapore"),
    airport("BKK", "Suvarnabhumi Airport", "Bangkok", "Thailand"),
    airport("SYD", "Kingsford Smith Airport", "Sydney", "Australia"),
    airport("FRA", "Frankfurt Airport", "Frankfurt", "Germany"),
    airport("AMS", "Schiphol Airport", "Amsterdam", "Netherlands"),
    airport("IST", "Istanbul Airport", "Istanbul", "Turkey"),
    airport("HND", "Haneda Airport", "Tokyo", "Japan"),
    airport("PEK", "Beijing Capital International", "Beijing", "China"),
    airport("DEL", "Indira Gandhi International", "Delhi", "India"),
    airport("MAD", "Barajas Airport", "Madrid", "Spain"),
];

/// Airports whose city, code, or name contains `query`, ignoring case.
/// A blank query matches everything.
pub fn filter(query: &str) -> Vec<&'static Airport> {
    let needle = query.trim().to_lowercase();
    AIRPORTS
        .iter()
        .filter(|a| {
            needle.is_empty()
                || a.city.to_lowercase().contains(&needle)
                || a.code.to_lowercase().contains(&needle)
                || a.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Look up an airport by its IATA code.
pub fn find(code: &str) -> Option<&'static Airport> {
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_city_code_and_name() {
        let codes = |q: &str| filter(q).iter().map(|a| a.code).collect::<Vec<_>>();
        assert_eq!(codes("lon"), vec!["LHR"]);
        assert_eq!(codes("jfk"), vec!["JFK"]);
        assert_eq!(codes("changi"), vec!["SIN"]);
        assert!(codes("international").len() > 3);
        assert!(codes("atlantis").is_empty());
    }

    #[test]
    fn blank_query_lists_catalog() {
        assert_eq!(filter("  ").len(), AIRPORTS.len());
    }

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find("dxb").map(|a| a.city), Some("Dubai"));
        assert!(find("XXX").is_none());
    }
}
