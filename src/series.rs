// Bounded time series
//
// One fixed-capacity FIFO window per measured quantity. Producers only append in
// increasing time, so insertion order is time order; the oldest sample is evicted
// once the window is full.

use std::collections::VecDeque;

use serde::Serialize;

use crate::constants::{MAX_POINTS_ACC, MAX_POINTS_ALT};

/// One reading of one quantity at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Seconds on the active time axis (replay runtime or live elapsed)
    pub time: f64,
    pub value: f64,
    /// Present for quantities plotted against altitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

/// The buffered quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    VerticalSpeed,
    Acceleration,
    Direction,
    Speed,
    Temperature,
    Humidity,
}

impl Quantity {
    pub const ALL: [Quantity; 6] = [
        Quantity::VerticalSpeed,
        Quantity::Acceleration,
        Quantity::Direction,
        Quantity::Speed,
        Quantity::Temperature,
        Quantity::Humidity,
    ];

    /// Window capacity for this quantity.
    pub fn capacity(self) -> usize {
        match self {
            Quantity::Acceleration => MAX_POINTS_ACC,
            _ => MAX_POINTS_ALT,
        }
    }

    /// Whether samples carry the altitude they were taken at.
    pub fn tracks_altitude(self) -> bool {
        !matches!(self, Quantity::VerticalSpeed | Quantity::Acceleration)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed-capacity sliding window of samples
#[derive(Debug, Clone)]
pub struct WindowedSeries {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl WindowedSeries {
    pub fn new(capacity: usize) -> Self {
        WindowedSeries {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append, evicting the oldest sample when full.
    pub fn append(&mut self, sample: Sample) {
        if self.capacity == 0 {
            return;
        }
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Ordered copy of the current window, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The six windows, indexed by quantity
#[derive(Debug, Clone)]
pub struct SeriesSet {
    series: [WindowedSeries; 6],
}

impl SeriesSet {
    pub fn new() -> Self {
        SeriesSet {
            series: Quantity::ALL.map(|q| WindowedSeries::new(q.capacity())),
        }
    }

    pub fn get(&self, quantity: Quantity) -> &WindowedSeries {
        &self.series[quantity.index()]
    }

    pub fn append(&mut self, quantity: Quantity, sample: Sample) {
        self.series[quantity.index()].append(sample);
    }

    /// Empty every window.
    pub fn reset(&mut self) {
        for s in self.series.iter_mut() {
            s.reset();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(WindowedSeries::is_empty)
    }
}

impl Default for SeriesSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> Sample {
        Sample { time: t, value: t * 2.0, altitude: None }
    }

    #[test]
    fn test_append_under_capacity() {
        let mut s = WindowedSeries::new(5);
        for i in 0..3 {
            s.append(sample(i as f64));
        }
        assert_eq!(s.len(), 3);
        assert_eq!(s.snapshot()[0].time, 0.0);
    }

    #[test]
    fn test_fifo_eviction_keeps_last_c() {
        let mut s = WindowedSeries::new(60);
        for i in 0..250 {
            s.append(sample(i as f64));
        }
        assert_eq!(s.len(), 60);
        let times: Vec<f64> = s.snapshot().iter().map(|x| x.time).collect();
        let expected: Vec<f64> = (190..250).map(|i| i as f64).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn test_reset() {
        let mut s = WindowedSeries::new(3);
        s.append(sample(1.0));
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 3);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut s = WindowedSeries::new(0);
        s.append(sample(1.0));
        assert!(s.is_empty());
    }

    #[test]
    fn test_quantity_capacities() {
        assert_eq!(Quantity::Acceleration.capacity(), 60);
        assert_eq!(Quantity::Temperature.capacity(), 10000);
        assert!(Quantity::Direction.tracks_altitude());
        assert!(!Quantity::Acceleration.tracks_altitude());
        assert!(!Quantity::VerticalSpeed.tracks_altitude());
    }

    #[test]
    fn test_series_set_routing() {
        let mut set = SeriesSet::new();
        assert!(set.is_empty());
        set.append(Quantity::Speed, sample(1.0));
        assert_eq!(set.get(Quantity::Speed).len(), 1);
        assert!(set.get(Quantity::Humidity).is_empty());
        assert_eq!(set.get(Quantity::Acceleration).capacity(), 60);
        set.reset();
        assert!(set.is_empty());
    }
}
