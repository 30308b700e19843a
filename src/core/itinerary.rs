use crate::core::date_range::{is_at_sea, CalendarDate, TimeInterval, TripStatus, INVALID_DATE};
use crate::core::images::{collect_all_urls, ImageField, ImageRef, DEFAULT_IMAGE_FIELDS};
use crate::core::rich_text::plain_text;
use crate::domain::model::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NO_TRIP_DESCRIPTION: &str = "No detailed description available yet.";

#[derive(Debug, Clone, Serialize)]
pub struct TripStop {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub short_description: Option<String>,
    pub interval: Option<TimeInterval>,
    pub status: TripStatus,
    pub is_current: bool,
    /// Today falls strictly between this stop and the next one.
    pub at_sea_after: bool,
    pub featured_image: Option<ImageRef>,
}

impl TripStop {
    /// Start comes from `date`, falling back to `startDate`. Stops whose
    /// start cannot be parsed are reported as past.
    pub fn from_entry(entry: &Entry, today: CalendarDate) -> Self {
        let title = entry.title().unwrap_or("Untitled").to_string();
        let interval = entry
            .raw_date("date")
            .or_else(|| entry.raw_date("startDate"))
            .and_then(|start| TimeInterval::resolve(start, entry.raw_date("endDate")));

        let status = interval
            .map(|interval| interval.status_on(today))
            .unwrap_or(TripStatus::Past);

        Self {
            id: entry.id.clone(),
            date_label: interval
                .map(|interval| interval.display())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            short_description: entry.text("shortDescription").map(str::to_string),
            interval,
            status,
            is_current: status == TripStatus::Current,
            at_sea_after: false,
            featured_image: ImageField::from_value(entry.field("featuredImage"), &title)
                .first()
                .cloned(),
            title,
        }
    }

    fn start(&self) -> Option<CalendarDate> {
        self.interval.map(|interval| interval.start)
    }
}

/// Stops in chronological order. Undated stops keep their relative order at
/// the end.
pub fn build_itinerary(entries: &[Entry], today: CalendarDate) -> Vec<TripStop> {
    let mut stops: Vec<TripStop> = entries
        .iter()
        .map(|entry| TripStop::from_entry(entry, today))
        .collect();
    stops.sort_by_key(|stop| (stop.start().is_none(), stop.start()));

    let at_sea: Vec<bool> = stops
        .windows(2)
        .map(|pair| match (&pair[0].interval, &pair[1].interval) {
            (Some(previous), Some(next)) => is_at_sea(previous, next, today),
            _ => false,
        })
        .collect();
    for (stop, at_sea) in stops.iter_mut().zip(at_sea) {
        stop.at_sea_after = at_sea;
    }

    stops
}

/// The write-up page of a single stop.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub is_current: bool,
    pub description: String,
    /// Every image on the entry, for the write-up's photo strip.
    pub images: Vec<String>,
}

impl TripDetail {
    pub fn from_entry(entry: &Entry, today: CalendarDate) -> Self {
        Self::from_stop(TripStop::from_entry(entry, today), entry)
    }

    fn from_stop(stop: TripStop, entry: &Entry) -> Self {
        let description = entry
            .field("description")
            .map(plain_text)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| NO_TRIP_DESCRIPTION.to_string());

        Self {
            id: stop.id,
            title: stop.title,
            date_label: stop.date_label,
            is_current: stop.is_current,
            description,
            images: collect_all_urls(&entry.fields, &DEFAULT_IMAGE_FIELDS),
        }
    }
}

/// Write-ups in the same order as [`build_itinerary`].
pub fn build_trip_details(entries: &[Entry], today: CalendarDate) -> Vec<TripDetail> {
    let mut details: Vec<(Option<CalendarDate>, TripDetail)> = entries
        .iter()
        .map(|entry| {
            let stop = TripStop::from_entry(entry, today);
            (stop.start(), TripDetail::from_stop(stop, entry))
        })
        .collect();
    details.sort_by_key(|(start, _)| (start.is_none(), *start));
    details.into_iter().map(|(_, detail)| detail).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl StopFilter {
    pub fn matches(&self, stop: &TripStop) -> bool {
        match self {
            StopFilter::All => true,
            StopFilter::Upcoming => {
                matches!(stop.status, TripStatus::Upcoming | TripStatus::Current)
            }
            StopFilter::Past => stop.status == TripStatus::Past,
        }
    }
}

impl FromStr for StopFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StopFilter::All),
            "upcoming" => Ok(StopFilter::Upcoming),
            "past" => Ok(StopFilter::Past),
            other => Err(format!(
                "unknown stop filter '{}', expected one of: all, upcoming, past",
                other
            )),
        }
    }
}

impl fmt::Display for StopFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopFilter::All => "all",
            StopFilter::Upcoming => "upcoming",
            StopFilter::Past => "past",
        };
        f.write_str(name)
    }
}

pub fn filter_stops(stops: &[TripStop], filter: StopFilter) -> Vec<TripStop> {
    stops.iter().filter(|stop| filter.matches(stop)).cloned().collect()
}

pub fn current_stop(stops: &[TripStop]) -> Option<&TripStop> {
    stops.iter().find(|stop| stop.is_current)
}
