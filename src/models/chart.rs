use super::trip::Trip;

pub const WIDTH: f64 = 600.0;
pub const HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 40.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 10.0;
const MARGIN_BOTTOM: f64 = 30.0;
const Y_TICKS: usize = 5;
const DOMAIN_PADDING: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub mpg: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub label: String,
    pub y: f64,
}

/// Line chart of mpg over time, oldest trip on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct MpgChart {
    pub points: Vec<ChartPoint>,
    pub ticks: Vec<AxisTick>,
    pub y_min: f64,
    pub y_max: f64,
}

impl MpgChart {
    /// `trips` is newest first, as stored. Returns `None` for an empty log.
    pub fn from_trips(trips: &[Trip]) -> Option<Self> {
        if trips.is_empty() {
            return None;
        }

        let (lo, hi) = trips
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), trip| {
                (lo.min(trip.mpg), hi.max(trip.mpg))
            });
        let y_min = lo - DOMAIN_PADDING;
        let y_max = hi + DOMAIN_PADDING;

        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let scale_y = |mpg: f64| MARGIN_TOP + (y_max - mpg) / (y_max - y_min) * plot_height;

        let count = trips.len();
        let points = trips
            .iter()
            .rev()
            .enumerate()
            .map(|(index, trip)| {
                let x = if count == 1 {
                    MARGIN_LEFT + plot_width / 2.0
                } else {
                    MARGIN_LEFT + plot_width * index as f64 / (count - 1) as f64
                };
                ChartPoint {
                    label: trip.date.clone(),
                    mpg: trip.mpg,
                    x,
                    y: scale_y(trip.mpg),
                }
            })
            .collect();

        let ticks = (0..Y_TICKS)
            .map(|step| {
                let value = y_min + (y_max - y_min) * step as f64 / (Y_TICKS - 1) as f64;
                AxisTick {
                    label: format!("{value:.1}"),
                    y: scale_y(value),
                }
            })
            .collect();

        Some(Self {
            points,
            ticks,
            y_min,
            y_max,
        })
    }

    /// Value for the SVG `points` attribute of the line.
    pub fn polyline(&self) -> String {
        self.points
            .iter()
            .map(|point| format!("{:.1},{:.1}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn axis_left(&self) -> f64 {
        MARGIN_LEFT
    }

    pub fn axis_right(&self) -> f64 {
        WIDTH - MARGIN_RIGHT
    }

    pub fn axis_bottom(&self) -> f64 {
        HEIGHT - MARGIN_BOTTOM
    }

    pub fn label_y(&self) -> f64 {
        HEIGHT - MARGIN_BOTTOM / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(date: &str, mpg: f64) -> Trip {
        Trip {
            id: date.into(),
            date: date.into(),
            start_odometer: 0.0,
            end_odometer: mpg,
            gallons: 1.0,
            mpg,
        }
    }

    #[test]
    fn no_chart_without_trips() {
        assert!(MpgChart::from_trips(&[]).is_none());
    }

    #[test]
    fn points_run_oldest_to_newest_with_padded_domain() {
        let chart = MpgChart::from_trips(&[trip("new", 24.0), trip("old", 30.0)]).unwrap();
        assert_eq!(chart.y_min, 22.0);
        assert_eq!(chart.y_max, 32.0);
        assert_eq!(chart.points[0].label, "old");
        assert_eq!(chart.points[1].label, "new");
        assert!(chart.points[0].x < chart.points[1].x);
        // higher mpg sits higher on screen
        assert!(chart.points[0].y < chart.points[1].y);
        assert_eq!(chart.ticks.len(), 5);
        assert_eq!(chart.ticks[0].label, "22.0");
        assert_eq!(chart.ticks[4].label, "32.0");
    }

    #[test]
    fn single_trip_is_centred() {
        let chart = MpgChart::from_trips(&[trip("only", 30.0)]).unwrap();
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].x, 40.0 + (600.0 - 60.0) / 2.0);
        assert_eq!(chart.polyline(), "310.0,140.0");
    }
}
