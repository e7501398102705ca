//! Daily weather → `ForecastSummary`.

use crate::constants::weather::{
    COLD_AVG_MIN_C, DRY_AVG_PRECIP_MM, HOT_AVG_MAX_C, PLEASANT_MAX_C, PLEASANT_MIN_C,
    WET_AVG_PRECIP_MM,
};
use crate::types::{ForecastSource, ForecastSummary};

use super::DailyWeather;

/// Aggregate daily data; `None` when there is nothing to aggregate
pub fn summarize(days: &[DailyWeather], source: ForecastSource) -> Option<ForecastSummary> {
    if days.is_empty() {
        return None;
    }

    let count = days.len() as f64;
    let min_temp = days.iter().map(|d| d.temp_min).fold(f64::INFINITY, f64::min);
    let max_temp = days.iter().map(|d| d.temp_max).fold(f64::NEG_INFINITY, f64::max);
    let avg_min_temp = round1(days.iter().map(|d| d.temp_min).sum::<f64>() / count);
    let avg_max_temp = round1(days.iter().map(|d| d.temp_max).sum::<f64>() / count);
    let avg_precipitation = round1(days.iter().map(|d| d.precipitation).sum::<f64>() / count);

    let estimated = source == ForecastSource::SeasonalAi;
    let recommendations =
        recommendations(avg_min_temp, avg_max_temp, avg_precipitation, estimated);

    Some(ForecastSummary {
        min_temp: round1(min_temp),
        max_temp: round1(max_temp),
        avg_min_temp,
        avg_max_temp,
        conditions: dominant_condition(days),
        avg_precipitation,
        recommendations,
        estimated,
        source,
        days_covered: days.len(),
    })
}

/// Most frequent label; ties go to the one seen first
fn dominant_condition(days: &[DailyWeather]) -> String {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for day in days {
        match tally.iter_mut().find(|(label, _)| *label == day.condition) {
            Some((_, n)) => *n += 1,
            None => tally.push((day.condition.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in tally {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label.to_string()).unwrap_or_default()
}

fn recommendations(avg_min: f64, avg_max: f64, avg_precip: f64, estimated: bool) -> Vec<String> {
    let mut out = Vec::new();

    if avg_max >= HOT_AVG_MAX_C {
        out.push(
            "Hot afternoons expected: plan outdoor sightseeing for early morning or evening and stay hydrated."
                .to_string(),
        );
    }
    if avg_min <= COLD_AVG_MIN_C {
        out.push("Cold mornings and nights: pack warm layers and a jacket.".to_string());
    }
    if avg_precip >= WET_AVG_PRECIP_MM {
        out.push(
            "Rain likely: carry an umbrella or rain jacket and keep indoor alternatives ready."
                .to_string(),
        );
    }
    if out.is_empty() {
        if (PLEASANT_MIN_C..=PLEASANT_MAX_C).contains(&avg_max) && avg_precip < DRY_AVG_PRECIP_MM {
            out.push(
                "Pleasant, dry weather: good conditions for walking tours and outdoor activities."
                    .to_string(),
            );
        } else {
            out.push("Mild but changeable weather: pack a light layer for the evenings.".to_string());
        }
    }
    if estimated {
        out.push(
            "Based on typical conditions for this time of year; check a live forecast closer to departure."
                .to_string(),
        );
    }

    out
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(offset: u32, min: f64, max: f64, rain: f64, condition: &str) -> DailyWeather {
        DailyWeather {
            date: NaiveDate::from_ymd_opt(2026, 5, 1 + offset).unwrap(),
            temp_min: min,
            temp_max: max,
            precipitation: rain,
            condition: condition.to_string(),
        }
    }

    #[test]
    fn test_empty_days_yield_none() {
        assert!(summarize(&[], ForecastSource::Forecast).is_none());
    }

    #[test]
    fn test_summary_statistics() {
        let days = vec![
            day(0, 12.0, 22.0, 0.0, "Clear sky"),
            day(1, 14.0, 24.0, 0.4, "Partly cloudy"),
            day(2, 11.0, 25.5, 0.2, "Clear sky"),
        ];
        let summary = summarize(&days, ForecastSource::Forecast).unwrap();
        assert_eq!(summary.min_temp, 11.0);
        assert_eq!(summary.max_temp, 25.5);
        assert_eq!(summary.avg_min_temp, 12.3);
        assert_eq!(summary.avg_max_temp, 23.8);
        assert_eq!(summary.avg_precipitation, 0.2);
        assert_eq!(summary.conditions, "Clear sky");
        assert_eq!(summary.days_covered, 3);
        assert!(!summary.estimated);
        assert_eq!(summary.recommendations.len(), 1);
        assert!(summary.recommendations[0].starts_with("Pleasant"));
    }

    #[test]
    fn test_condition_tie_goes_to_first_seen() {
        let days = vec![
            day(0, 10.0, 20.0, 0.0, "Overcast"),
            day(1, 10.0, 20.0, 0.0, "Slight rain"),
            day(2, 10.0, 20.0, 0.0, "Slight rain"),
            day(3, 10.0, 20.0, 0.0, "Overcast"),
        ];
        assert_eq!(dominant_condition(&days), "Overcast");
    }

    #[test]
    fn test_threshold_recommendations() {
        let hot_wet = vec![day(0, 26.0, 36.0, 12.0, "Heavy rain")];
        let recs = summarize(&hot_wet, ForecastSource::Forecast).unwrap().recommendations;
        assert_eq!(recs.len(), 2);
        assert!(recs[0].starts_with("Hot"));
        assert!(recs[1].starts_with("Rain"));

        let cold = vec![day(0, -4.0, 3.0, 0.0, "Snow grains")];
        let recs = summarize(&cold, ForecastSource::Forecast).unwrap().recommendations;
        assert!(recs[0].starts_with("Cold"));
    }

    #[test]
    fn test_estimated_summary_adds_notice() {
        let days = vec![day(0, 12.0, 22.0, 0.0, "Clear sky")];
        let summary = summarize(&days, ForecastSource::SeasonalAi).unwrap();
        assert!(summary.estimated);
        assert_eq!(summary.source, ForecastSource::SeasonalAi);
        assert!(summary.recommendations.last().unwrap().contains("typical conditions"));
    }
}
