//! Shared argument types and value parsers for the playlist subcommands.

use clap::Args;

use fitrkr_core::playlist::PlaylistError;
use fitrkr_db::models::{ConfigParams, Visibility};

/// Exercise parameters. Omitted flags stay unset, except rest which
/// defaults to 60 seconds.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub sets: Option<i32>,
    #[arg(long)]
    pub reps_min: Option<i32>,
    #[arg(long)]
    pub reps_max: Option<i32>,
    #[arg(long)]
    pub weight: Option<f64>,
    #[arg(long)]
    pub rest_seconds: Option<i32>,
    /// Four comma-separated phase durations, e.g. 3,1,1,0
    #[arg(long, value_delimiter = ',')]
    pub tempo: Vec<i64>,
    #[arg(long)]
    pub duration_seconds: Option<i32>,
    #[arg(long)]
    pub distance: Option<f64>,
    #[arg(long)]
    pub target_pace: Option<f64>,
    #[arg(long)]
    pub target_heart_rate: Option<i32>,
    #[arg(long)]
    pub incline: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<ConfigArgs> for ConfigParams {
    fn from(args: ConfigArgs) -> Self {
        ConfigParams {
            sets: args.sets,
            reps_min: args.reps_min,
            reps_max: args.reps_max,
            weight: args.weight,
            rest_seconds: args.rest_seconds,
            tempo: args.tempo,
            duration_seconds: args.duration_seconds,
            distance: args.distance,
            target_pace: args.target_pace,
            target_heart_rate: args.target_heart_rate,
            incline: args.incline,
            notes: args.notes,
        }
    }
}

/// Parse `ID=ORDER` as used by the reorder commands.
pub fn parse_order_pair(raw: &str) -> Result<(i64, i32), String> {
    let (id, order) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=ORDER, got {raw:?}"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid id in {raw:?}"))?;
    let order = order
        .trim()
        .parse()
        .map_err(|_| format!("invalid order in {raw:?}"))?;
    Ok((id, order))
}

/// Visibility flags arrive as text so a bad value is reported in the
/// envelope like any other validation failure.
pub fn parse_visibility(raw: Option<&str>) -> Result<Option<Visibility>, PlaylistError> {
    raw.map(|v| {
        v.parse::<Visibility>()
            .map_err(|e| PlaylistError::Validation(e.to_string()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_pairs_parse() {
        assert_eq!(parse_order_pair("12=3"), Ok((12, 3)));
        assert_eq!(parse_order_pair(" 7 = 1 "), Ok((7, 1)));
        assert!(parse_order_pair("12").is_err());
        assert!(parse_order_pair("x=1").is_err());
        assert!(parse_order_pair("1=y").is_err());
    }

    #[test]
    fn visibility_parse_errors_are_validation() {
        assert_eq!(parse_visibility(None).unwrap(), None);
        assert_eq!(
            parse_visibility(Some("public")).unwrap(),
            Some(Visibility::Public)
        );
        assert!(matches!(
            parse_visibility(Some("friends")),
            Err(PlaylistError::Validation(_))
        ));
    }

    #[test]
    fn config_args_convert() {
        let params: ConfigParams = ConfigArgs {
            sets: Some(3),
            tempo: vec![3, 1, 1, 0],
            ..Default::default()
        }
        .into();
        assert_eq!(params.sets, Some(3));
        assert_eq!(params.tempo, vec![3, 1, 1, 0]);
        assert_eq!(params.rest_seconds_or_default(), 60);
    }
}
