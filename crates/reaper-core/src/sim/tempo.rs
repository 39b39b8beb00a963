//! Piecewise-constant tempo map

/// One tempo/time-signature point
#[derive(Debug, Clone, PartialEq)]
pub struct TempoPoint {
    /// Position in seconds
    pub time: f64,
    /// Position in quarter notes, derived from the points before it
    pub qn: f64,
    pub bpm: f64,
    pub numerator: i32,
    pub denominator: i32,
}

/// Tempo map with at least one point at time zero
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    points: Vec<TempoPoint>,
}

impl TempoMap {
    pub fn new(bpm: f64, numerator: i32, denominator: i32) -> Self {
        Self {
            points: vec![TempoPoint {
                time: 0.0,
                qn: 0.0,
                bpm,
                numerator,
                denominator,
            }],
        }
    }

    pub fn points(&self) -> &[TempoPoint] {
        &self.points
    }

    /// The first point, which carries the project tempo and signature
    pub fn first(&self) -> &TempoPoint {
        &self.points[0]
    }

    /// Index of the point in effect at `time`
    pub fn segment_at(&self, time: f64) -> usize {
        self.points
            .iter()
            .rposition(|p| p.time <= time)
            .unwrap_or(0)
    }

    pub fn bpm_at(&self, time: f64) -> f64 {
        self.points[self.segment_at(time)].bpm
    }

    pub fn time_to_qn(&self, time: f64) -> f64 {
        let p = &self.points[self.segment_at(time)];
        p.qn + (time - p.time) * p.bpm / 60.0
    }

    pub fn qn_to_time(&self, qn: f64) -> f64 {
        let idx = self
            .points
            .iter()
            .rposition(|p| p.qn <= qn)
            .unwrap_or(0);
        let p = &self.points[idx];
        p.time + (qn - p.qn) * 60.0 / p.bpm
    }

    /// Change the tempo of the segment in effect at `time`
    pub fn set_bpm_at(&mut self, time: f64, bpm: f64) {
        let idx = self.segment_at(time);
        self.points[idx].bpm = bpm;
        self.reflow();
    }

    /// Add a point, or replace the one already sitting at `time`
    pub fn upsert(&mut self, time: f64, bpm: f64, numerator: i32, denominator: i32) {
        let time = time.max(0.0);
        let point = TempoPoint {
            time,
            qn: 0.0,
            bpm,
            numerator,
            denominator,
        };
        match self
            .points
            .iter()
            .position(|p| (p.time - time).abs() < 1e-9)
        {
            Some(idx) => self.points[idx] = point,
            None => {
                let idx = self.points.partition_point(|p| p.time < time);
                self.points.insert(idx, point);
            }
        }
        self.reflow();
    }

    /// Edit an existing point in place
    pub fn edit(&mut self, index: usize, bpm: f64, numerator: i32, denominator: i32) -> bool {
        match self.points.get_mut(index) {
            Some(p) => {
                p.bpm = bpm;
                p.numerator = numerator;
                p.denominator = denominator;
                self.reflow();
                true
            }
            None => false,
        }
    }

    /// Recompute quarter-note positions after a change
    fn reflow(&mut self) {
        let mut qn = 0.0;
        let mut prev: Option<(f64, f64)> = None;
        for p in &mut self.points {
            if let Some((time, bpm)) = prev {
                qn += (p.time - time) * bpm / 60.0;
            }
            p.qn = qn;
            prev = Some((p.time, p.bpm));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let map = TempoMap::new(120.0, 4, 4);
        assert!((map.time_to_qn(2.0) - 4.0).abs() < 1e-9);
        assert!((map.qn_to_time(16.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_segments() {
        let mut map = TempoMap::new(120.0, 4, 4);
        // 60 BPM from 4s (= beat 8)
        map.upsert(4.0, 60.0, 4, 4);

        assert!((map.time_to_qn(4.0) - 8.0).abs() < 1e-9);
        assert!((map.time_to_qn(6.0) - 10.0).abs() < 1e-9);
        assert!((map.qn_to_time(10.0) - 6.0).abs() < 1e-9);
        assert!((map.qn_to_time(7.0) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_changing_first_tempo_moves_later_beats() {
        let mut map = TempoMap::new(120.0, 4, 4);
        map.upsert(4.0, 60.0, 4, 4);
        map.set_bpm_at(0.0, 60.0);

        assert_eq!(map.points()[1].qn, 4.0);
        assert!((map.time_to_qn(5.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_upsert_replaces_point_at_same_time() {
        let mut map = TempoMap::new(120.0, 4, 4);
        map.upsert(0.0, 90.0, 5, 4);
        assert_eq!(map.points().len(), 1);
        assert_eq!(map.first().numerator, 5);
        assert_eq!(map.first().bpm, 90.0);
    }
}
