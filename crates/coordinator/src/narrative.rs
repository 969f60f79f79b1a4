use flows::CorridorRecord;

/// Dominant-corridor share at or above which flows read as concentrated.
pub const CONCENTRATED_SHARE: f64 = 0.6;
/// Dominant-corridor share at or below which flows read as spread out.
pub const DIFFUSE_SHARE: f64 = 0.4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Concentration {
    Concentrated,
    Diffuse,
    Mixed,
}

impl Concentration {
    pub fn from_share(share: f64) -> Self {
        if share >= CONCENTRATED_SHARE {
            Concentration::Concentrated
        } else if share <= DIFFUSE_SHARE {
            Concentration::Diffuse
        } else {
            Concentration::Mixed
        }
    }
}

/// What the focus country mostly does in the rendered corridors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CountryRole {
    OriginAndDestination,
    MostlyOrigin,
    MostlyDestination,
}

/// Text for the descriptive panel next to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// `None` when there is nothing to describe.
    pub concentration: Option<Concentration>,
    pub role: Option<CountryRole>,
    /// Largest per-direction share of the top corridor.
    pub dominant_share: f64,
}

impl Narrative {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n\n")
    }

    pub fn loading() -> Self {
        Self::message(String::new(), "Loading migration corridors.")
    }

    pub fn unavailable() -> Self {
        Self::message(String::new(), "Migration data could not be loaded.")
    }

    pub fn no_focus(year: i32) -> Self {
        Self::message(
            format!("Migration corridors in {year}"),
            "Select a country to see its migration corridors.",
        )
    }

    fn message(title: String, body: &str) -> Self {
        Self {
            title,
            paragraphs: vec![body.to_string()],
            concentration: None,
            role: None,
            dominant_share: 0.0,
        }
    }
}

/// Share of the largest corridor in a direction's total; 0 when empty.
///
/// `flows` must be sorted largest first.
pub fn dominant_share(flows: &[CorridorRecord]) -> f64 {
    let total: f64 = flows.iter().map(|r| r.migrants_millions).sum();
    match flows.first() {
        Some(top) if total > 0.0 => top.migrants_millions / total,
        _ => 0.0,
    }
}

/// Describes one country's corridors for a year.
///
/// `outbound` and `inbound` are the rendered sets, sorted largest first.
pub fn narrative_for(
    country: &str,
    year: i32,
    outbound: &[CorridorRecord],
    inbound: &[CorridorRecord],
) -> Narrative {
    let title = format!("Migration corridors of {country} in {year}");
    if outbound.is_empty() && inbound.is_empty() {
        return Narrative {
            title,
            paragraphs: vec![format!(
                "No migration corridor data is available for {country} in {year}."
            )],
            concentration: None,
            role: None,
            dominant_share: 0.0,
        };
    }

    let share = dominant_share(outbound).max(dominant_share(inbound));
    let concentration = Concentration::from_share(share);
    let role = match (outbound.is_empty(), inbound.is_empty()) {
        (false, false) => CountryRole::OriginAndDestination,
        (false, true) => CountryRole::MostlyOrigin,
        _ => CountryRole::MostlyDestination,
    };

    let mut paragraphs = vec![format!(
        "Migration corridors show how people move and how countries relate within wider \
         mobility systems. For {country} in {year}, the flow map highlights its strongest \
         connections."
    )];

    let mut summary = match role {
        CountryRole::OriginAndDestination => {
            format!("{country} appears both as a country of origin and destination.")
        }
        CountryRole::MostlyOrigin => {
            format!("This year, {country} mostly acts as a country of origin.")
        }
        CountryRole::MostlyDestination => format!("This year, {country} mostly receives migrants."),
    };
    match concentration {
        Concentration::Concentrated => {
            summary.push_str(" Flows are highly concentrated in one dominant corridor.")
        }
        Concentration::Diffuse => {
            summary.push_str(" Flows are spread across multiple destinations.")
        }
        Concentration::Mixed => {}
    }
    paragraphs.push(summary);

    let mut partners = Vec::new();
    if let Some(top) = outbound.first() {
        partners.push(format!(
            "The strongest emigration corridor leads from {country} to {}.",
            top.destination_name
        ));
    }
    if let Some(top) = inbound.first() {
        partners.push(format!(
            "The main immigration corridor comes from {}.",
            top.origin_name
        ));
    }
    paragraphs.push(partners.join("\n"));

    Narrative {
        title,
        paragraphs,
        concentration: Some(concentration),
        role: Some(role),
        dominant_share: share,
    }
}

#[cfg(test)]
mod tests {
    use super::{Concentration, CountryRole, dominant_share, narrative_for};
    use flows::CorridorRecord;
    use foundation::IsoCode;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rec(origin: &str, dest: &str, dest_name: &str, m: f64) -> CorridorRecord {
        CorridorRecord {
            year: 2020,
            origin_iso: IsoCode::parse(origin).unwrap(),
            destination_iso: IsoCode::parse(dest).unwrap(),
            origin_name: origin.to_string(),
            destination_name: dest_name.to_string(),
            origin_subregion: String::new(),
            destination_subregion: String::new(),
            migrants_millions: m,
        }
    }

    #[test]
    fn share_thresholds_are_inclusive() {
        assert_eq!(Concentration::from_share(0.6), Concentration::Concentrated);
        assert_eq!(Concentration::from_share(0.4), Concentration::Diffuse);
        assert_eq!(Concentration::from_share(0.5), Concentration::Mixed);
    }

    #[test]
    fn empty_sets_give_explicit_message() {
        let n = narrative_for("Mexico", 1990, &[], &[]);
        assert_eq!(n.title, "Migration corridors of Mexico in 1990");
        assert_eq!(
            n.text(),
            "No migration corridor data is available for Mexico in 1990."
        );
        assert_eq!(n.concentration, None);
    }

    #[test]
    fn single_corridor_per_side_is_concentrated() {
        let out = [rec("MEX", "USA", "United States", 5.0)];
        let inb = [rec("CAN", "MEX", "Mexico", 1.2)];
        let n = narrative_for("Mexico", 2020, &out, &inb);
        assert_eq!(n.dominant_share, 1.0);
        assert_eq!(n.concentration, Some(Concentration::Concentrated));
        assert_eq!(n.role, Some(CountryRole::OriginAndDestination));
        let text = n.text();
        assert!(text.contains("highly concentrated"));
        assert!(text.contains("from Mexico to United States"));
        assert!(text.contains("comes from CAN"));
    }

    #[test]
    fn even_spread_is_diffuse() {
        let out = [
            rec("DEU", "AUT", "Austria", 1.0),
            rec("DEU", "CHE", "Switzerland", 1.0),
            rec("DEU", "FRA", "France", 1.0),
        ];
        let n = narrative_for("Germany", 2020, &out, &[]);
        assert_eq!(n.concentration, Some(Concentration::Diffuse));
        assert_eq!(n.role, Some(CountryRole::MostlyOrigin));
        assert!(n.text().contains("spread across multiple destinations"));
        assert!(!n.text().contains("immigration corridor"));
    }

    #[test]
    fn zero_totals_have_zero_share() {
        assert_eq!(dominant_share(&[rec("AAA", "BBB", "B", 0.0)]), 0.0);
        assert_eq!(dominant_share(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn branch_follows_largest_direction_share(
            outs in proptest::collection::vec(0.0f64..10.0, 1..15),
            ins in proptest::collection::vec(0.0f64..10.0, 0..15),
        ) {
            let sorted = |mut v: Vec<f64>| {
                v.sort_by(|a, b| b.total_cmp(a));
                v
            };
            let out: Vec<_> = sorted(outs).into_iter().map(|m| rec("AAA", "BBB", "B", m)).collect();
            let inb: Vec<_> = sorted(ins).into_iter().map(|m| rec("BBB", "AAA", "A", m)).collect();
            let n = narrative_for("A", 2020, &out, &inb);
            prop_assert!((0.0..=1.0).contains(&n.dominant_share));
            prop_assert_eq!(n.concentration, Some(Concentration::from_share(n.dominant_share)));
        }
    }
}
