//! Shared frame assembly for the two readers.

use plumber_model::{TIME_COLUMN, VariableSelection};
use polars::prelude::{Column, DataFrame, Int64Chunked, IntoColumn, IntoSeries, TimeUnit};

use crate::error::Result;

/// Name of the synthesized net-radiation variable.
pub(crate) const NET_RADIATION: &str = "Rnet";
/// Operands of the net-radiation sum.
pub(crate) const NET_SHORTWAVE: &str = "SWnet";
pub(crate) const NET_LONGWAVE: &str = "LWnet";

/// A named column of optional values, pre-frame.
pub(crate) type RawColumn = (String, Vec<Option<f64>>);

/// Append `Rnet = SWnet + LWnet` when both operands are present and `Rnet`
/// itself is not. Missing operands mean the variable is silently skipped;
/// a position where either operand is null stays null.
pub(crate) fn synthesize_net_radiation(columns: &mut Vec<RawColumn>) {
    if columns.iter().any(|(name, _)| name == NET_RADIATION) {
        return;
    }
    let shortwave = columns.iter().find(|(name, _)| name == NET_SHORTWAVE);
    let longwave = columns.iter().find(|(name, _)| name == NET_LONGWAVE);
    let (Some((_, shortwave)), Some((_, longwave))) = (shortwave, longwave) else {
        return;
    };
    if shortwave.len() != longwave.len() {
        return;
    }
    let summed: Vec<Option<f64>> = shortwave
        .iter()
        .zip(longwave.iter())
        .map(|(sw, lw)| match (sw, lw) {
            (Some(sw), Some(lw)) => Some(sw + lw),
            _ => None,
        })
        .collect();
    columns.push((NET_RADIATION.to_string(), summed));
}

/// Keep only the variables the selection wants. Requested names with no
/// matching column simply produce nothing.
pub(crate) fn apply_selection(
    columns: Vec<RawColumn>,
    selection: &VariableSelection,
) -> Vec<RawColumn> {
    columns
        .into_iter()
        .filter(|(name, _)| selection.wants(name))
        .collect()
}

/// Build the output frame: time first as millisecond datetimes, variable
/// columns after, rows sorted ascending by time. The sort is stable, so
/// duplicate timestamps keep their input order.
pub(crate) fn build_frame(mut epochs: Vec<i64>, mut columns: Vec<RawColumn>) -> Result<DataFrame> {
    let mut order: Vec<usize> = (0..epochs.len()).collect();
    order.sort_by_key(|idx| epochs[*idx]);
    if order.iter().enumerate().any(|(position, idx)| position != *idx) {
        epochs = order.iter().map(|idx| epochs[*idx]).collect();
        for (_, values) in &mut columns {
            *values = order.iter().map(|idx| values[*idx]).collect();
        }
    }

    let time = Int64Chunked::from_vec(TIME_COLUMN.into(), epochs)
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
    let mut frame_columns = Vec::with_capacity(columns.len() + 1);
    frame_columns.push(time.into_column());
    for (name, values) in columns {
        frame_columns.push(Column::new(name.into(), values));
    }
    Ok(DataFrame::new(frame_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[f64]) -> RawColumn {
        (
            name.to_string(),
            values.iter().map(|v| Some(*v)).collect(),
        )
    }

    #[test]
    fn net_radiation_is_the_sum_of_its_operands() {
        let mut columns = vec![column("SWnet", &[100.0, 110.0]), column("LWnet", &[50.0, 51.0])];
        synthesize_net_radiation(&mut columns);
        let (name, values) = columns.last().unwrap();
        assert_eq!(name, "Rnet");
        assert_eq!(values, &vec![Some(150.0), Some(161.0)]);
    }

    #[test]
    fn net_radiation_is_skipped_without_both_operands() {
        let mut columns = vec![column("SWnet", &[100.0])];
        synthesize_net_radiation(&mut columns);
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn an_existing_net_radiation_column_wins() {
        let mut columns = vec![
            column("SWnet", &[100.0]),
            column("LWnet", &[50.0]),
            column("Rnet", &[999.0]),
        ];
        synthesize_net_radiation(&mut columns);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2].1, vec![Some(999.0)]);
    }

    #[test]
    fn rows_are_sorted_by_time() {
        let epochs = vec![3_000, 1_000, 2_000];
        let columns = vec![column("Qle", &[3.0, 1.0, 2.0])];
        let frame = build_frame(epochs, columns).unwrap();
        let series = plumber_model::TimeSeries::new(frame);
        assert_eq!(series.column_f64("Qle").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.time_epochs_ms().unwrap(), vec![1_000, 2_000, 3_000]);
    }
}
