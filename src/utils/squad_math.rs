/// Squad composition arithmetic for the `/squads` calculator

/// Troop counts of a single squad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquadSplit {
    pub infantry: f64,
    pub lancer: f64,
    pub marksman: f64,
}

impl SquadSplit {
    /// Rounded display values
    pub fn rounded(&self) -> (i64, i64, i64) {
        (
            self.infantry.round() as i64,
            self.lancer.round() as i64,
            self.marksman.round() as i64,
        )
    }
}

/// Ratio rule for the caller's own march; defaults to `10:20:70`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum OwnMarchRule {
    #[default]
    #[name = "10:20:70"]
    Ratio102070,
    #[name = "10:20:80"]
    Ratio102080,
    #[name = "20:30:50"]
    Ratio203050,
    #[name = "33:33:33"]
    RatioEqual,
}

/// Fill rule for squads joining other players' marches; defaults to
/// `1k:fill:max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum JoinerMarchRule {
    #[default]
    #[name = "1k:fill:max"]
    ThousandFillMax,
    #[name = "10:20:70"]
    Ratio102070,
    #[name = "1:9:90"]
    Ratio1990,
}

/// Split the caller's own squad by the chosen ratio rule
pub fn own_squad_split(rule: OwnMarchRule, squad_size: f64) -> SquadSplit {
    match rule {
        OwnMarchRule::Ratio102070 => SquadSplit {
            infantry: squad_size * 0.1,
            lancer: squad_size * 0.2,
            marksman: squad_size * 0.7,
        },
        OwnMarchRule::Ratio102080 => SquadSplit {
            infantry: squad_size * 0.1,
            lancer: squad_size * 0.2,
            marksman: squad_size * 0.8,
        },
        OwnMarchRule::Ratio203050 => SquadSplit {
            infantry: squad_size * 0.2,
            lancer: squad_size * 0.3,
            marksman: squad_size * 0.5,
        },
        OwnMarchRule::RatioEqual => SquadSplit {
            infantry: squad_size / 3.0,
            lancer: squad_size / 3.0,
            marksman: squad_size / 3.0,
        },
    }
}

/// Split a joiner squad.
///
/// The `1k:fill:max` rule packs 1000 infantry, spreads the remaining
/// marksmen evenly over the march count, and fills the rest with lancers.
pub fn joiner_squad_split(
    rule: JoinerMarchRule,
    squad_size: f64,
    marksman_left: f64,
    march_count: f64,
) -> SquadSplit {
    match rule {
        JoinerMarchRule::ThousandFillMax => {
            let marksman = marksman_left / march_count;
            SquadSplit {
                infantry: 1000.0,
                lancer: squad_size - 1000.0 - marksman,
                marksman,
            }
        }
        JoinerMarchRule::Ratio102070 => SquadSplit {
            infantry: squad_size * 0.1,
            lancer: squad_size * 0.2,
            marksman: squad_size * 0.7,
        },
        JoinerMarchRule::Ratio1990 => SquadSplit {
            infantry: squad_size * 0.01,
            lancer: squad_size * 0.09,
            marksman: squad_size * 0.9,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_defaults() {
        assert_eq!(OwnMarchRule::default(), OwnMarchRule::Ratio102070);
        assert_eq!(JoinerMarchRule::default(), JoinerMarchRule::ThousandFillMax);
    }

    #[test]
    fn test_own_squad_10_20_70() {
        let split = own_squad_split(OwnMarchRule::Ratio102070, 1000.0);
        assert_eq!(split.rounded(), (100, 200, 700));
    }

    #[test]
    fn test_own_squad_equal_thirds() {
        let split = own_squad_split(OwnMarchRule::RatioEqual, 900.0);
        assert_eq!(split.rounded(), (300, 300, 300));
    }

    #[test]
    fn test_own_squad_20_30_50() {
        let split = own_squad_split(OwnMarchRule::Ratio203050, 2000.0);
        assert_eq!(split.rounded(), (400, 600, 1000));
    }

    #[test]
    fn test_joiner_thousand_fill_max() {
        // 6000 marksmen left over 3 marches -> 2000 marksmen per squad
        let split = joiner_squad_split(JoinerMarchRule::ThousandFillMax, 5000.0, 6000.0, 3.0);
        assert_eq!(split.rounded(), (1000, 2000, 2000));
    }

    #[test]
    fn test_joiner_ratio_1_9_90() {
        let split = joiner_squad_split(JoinerMarchRule::Ratio1990, 1000.0, 0.0, 1.0);
        assert_eq!(split.rounded(), (10, 90, 900));
    }

    #[test]
    fn test_joiner_squad_size_is_preserved_by_fill_rule() {
        let split = joiner_squad_split(JoinerMarchRule::ThousandFillMax, 4000.0, 3000.0, 2.0);
        let total = split.infantry + split.lancer + split.marksman;
        assert!((total - 4000.0).abs() < f64::EPSILON);
    }
}
