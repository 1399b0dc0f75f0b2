use chrono::NaiveDate;
use postgres_types::ToSql;

use crate::model::{
    constants::{CLASS_FLAG_ENABLED, FINISHED_STATUS},
    structures::discipline::Discipline
};

/// Composes the filters selecting eligible results out of
/// `results r JOIN events e JOIN classes c`.
///
/// Every value is bound as a `$n` parameter; only the fixed clause text is
/// concatenated. Only finished results are ever selected: `$1` is the finished
/// status, shared by the status filter and the field size subquery.
pub struct ResultQuery {
    filters: Vec<String>,
    params: Vec<Box<dyn ToSql + Sync + Send>>
}

impl Default for ResultQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultQuery {
    pub fn new() -> ResultQuery {
        let mut query = ResultQuery {
            filters: Vec::new(),
            params: Vec::new()
        };
        let status = query.bind(FINISHED_STATUS.to_string());
        query.filters.push(format!("r.status = {}", status));

        query
    }

    /// Every filter that makes a result count toward the ranking of `discipline`
    /// for events dated within `[from, to]`.
    pub fn eligible(discipline: Discipline, from: NaiveDate, to: NaiveDate) -> ResultQuery {
        ResultQuery::new()
            .ranked_classes()
            .scoring()
            .discipline(discipline)
            .dated_between(from, to)
    }

    fn bind<T: ToSql + Sync + Send + 'static>(&mut self, value: T) -> String {
        self.params.push(Box::new(value));
        format!("${}", self.params.len())
    }

    /// Classes flagged both series-eligible and points-awarding.
    pub fn ranked_classes(mut self) -> Self {
        let series_eligible = self.bind(CLASS_FLAG_ENABLED);
        let awards_points = self.bind(CLASS_FLAG_ENABLED);
        self.filters.push(format!(
            "c.series_eligible::INT4 = {} AND c.awards_points::INT4 = {}",
            series_eligible, awards_points
        ));
        self
    }

    /// Results carrying points, either in `points` or in the split run columns.
    pub fn scoring(mut self) -> Self {
        self.filters.push(
            "(COALESCE(r.points, 0) > 0 OR COALESCE(r.run_1_points, 0) + COALESCE(r.run_2_points, 0) > 0)"
                .to_string()
        );
        self
    }

    pub fn discipline(mut self, discipline: Discipline) -> Self {
        let names: Vec<String> = discipline
            .event_disciplines()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect();
        let placeholder = self.bind(names);
        self.filters.push(format!("UPPER(e.discipline::TEXT) = ANY({})", placeholder));
        self
    }

    pub fn dated_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        let from = self.bind(from);
        let to = self.bind(to);
        self.filters.push(format!("e.date::DATE BETWEEN {} AND {}", from, to));
        self
    }

    fn where_clause(&self) -> String {
        format!("WHERE {}", self.filters.join(" AND "))
    }

    /// Eligible results with their event metadata, the rider's club and the event's
    /// field size, in a stable order.
    pub fn results_sql(&self) -> String {
        format!(
            "SELECT r.id AS result_id, r.rider_id, rd.club_id, r.event_id, e.date::DATE AS event_date, \
            e.event_level::TEXT AS event_level, r.points::FLOAT8 AS points, r.run_1_points::FLOAT8 AS run_1_points, \
            r.run_2_points::FLOAT8 AS run_2_points, fs.field_size \
            FROM results r \
            JOIN events e ON e.id = r.event_id \
            JOIN classes c ON c.id = r.class_id \
            LEFT JOIN riders rd ON rd.id = r.rider_id \
            JOIN LATERAL ( \
                SELECT COUNT(DISTINCT f.rider_id) AS field_size FROM results f \
                WHERE f.event_id = e.id AND f.status = $1 \
            ) fs ON TRUE \
            {} \
            ORDER BY e.date, e.id, r.rider_id, r.id",
            self.where_clause()
        )
    }

    /// Distinct dates of events carrying at least one eligible result, ascending.
    pub fn event_dates_sql(&self) -> String {
        format!(
            "SELECT DISTINCT e.date::DATE AS event_date \
            FROM results r \
            JOIN events e ON e.id = r.event_id \
            JOIN classes c ON c.id = r.class_id \
            {} \
            ORDER BY event_date",
            self.where_clause()
        )
    }

    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}
