//! Chart builders over the collected tables

use super::figure::{Axis, Bins, Color, Figure, Font, Legend, Line, Marker, Shape, Trace};
use crate::analysis::{pearson, quantile, PROPOSAL_BUCKETS};
use crate::error::CensusError;
use crate::table::{Cell, Table};
use serde_json::{json, Value};

pub const GRID_COLOR: &str = "#B0BEC5";
pub const PLOT_COLOR: &str = "#03A9F4";
pub const LIGHT_BLUE: &str = "#d4e6f1";
pub const DARK_BLUE: &str = "#2471a3";

const DATE_FORMAT: &str = "%b, %Y";

/// DAOs left out of the boosting correlation.
pub const BOOSTING_EXCLUDED: [&str; 1] = ["Kyber DAO Exp#2"];
/// DAOs left out of the prediction rate chart.
pub const PREDICTION_EXCLUDED: [&str; 2] = ["BuffiDAO", "Fortmatic DAO"];

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => json!(b),
        Cell::Int(i) => json!(i),
        Cell::Float(f) if f.is_finite() => json!(f),
        Cell::Float(_) => Value::Null,
        Cell::Text(s) => json!(s),
    }
}

fn values(table: &Table, column: &str) -> Result<Vec<Value>, CensusError> {
    Ok(table.column(column)?.into_iter().map(cell_value).collect())
}

fn framed_axis() -> Axis {
    Axis {
        ticks: Some("outside".to_string()),
        ticklen: Some(5.0),
        tickwidth: Some(2.0),
        tickfont: Some(Font {
            size: Some(14.0),
            color: None,
        }),
        showline: Some(true),
        linewidth: Some(2.0),
        linecolor: Some("black".to_string()),
        ..Axis::default()
    }
}

fn gridded(mut axis: Axis) -> Axis {
    axis.showgrid = Some(true);
    axis.gridwidth = Some(0.5);
    axis.gridcolor = Some(GRID_COLOR.to_string());
    axis
}

fn name_axis() -> Axis {
    Axis {
        tickangle: Some(45.0),
        ..framed_axis()
    }
}

fn top_legend(y: f64) -> Legend {
    Legend {
        orientation: Some("h".to_string()),
        x: Some(0.0),
        y: Some(y),
        ..Legend::default()
    }
}

fn joint_marker() -> Marker {
    Marker {
        color: Some(PLOT_COLOR.into()),
        size: Some(10.0),
        opacity: Some(0.5),
        line: Some(Line {
            color: Some("black".to_string()),
            width: Some(0.7),
            dash: None,
        }),
        ..Marker::default()
    }
}

/// Scatter of `y` against `x` titled with their Pearson coefficient.
pub fn correlation(table: &Table, x: &str, y: &str, x_title: &str, y_title: &str) -> Result<Figure, CensusError> {
    let r = pearson(&table.column_f64(x)?, &table.column_f64(y)?);

    let mut figure = Figure::with_traces(vec![
        Trace::scatter(values(table, x)?, values(table, y)?).with_marker(joint_marker()),
    ]);
    figure.set_title(match r {
        Some(r) => format!("pearsonr = {:.2}", r),
        None => "pearsonr = n/a".to_string(),
    });
    figure.layout.xaxis = Some(Axis::titled(x_title));
    figure.layout.yaxis = Some(Axis::titled(y_title));
    figure.layout.plot_bgcolor = Some("white".to_string());
    Ok(figure)
}

/// Users versus proposals per DAO.
pub fn census_scatter(census: &Table) -> Result<Figure, CensusError> {
    let mut figure = Figure::with_traces(vec![Trace::scatter(
        values(census, "n_users")?,
        values(census, "n_proposals")?,
    )
    .with_marker(Marker {
        color: Some("#BA68C8".into()),
        size: Some(14.0),
        line: Some(Line {
            color: Some("skyblue".to_string()),
            width: Some(2.0),
            dash: None,
        }),
        ..Marker::default()
    })]);
    figure.layout.xaxis = Some(Axis::titled("n_users"));
    figure.layout.yaxis = Some(Axis::titled("n_proposals"));
    Ok(figure)
}

/// Users per DAO on log axes.
pub fn user_distribution(census: &Table) -> Result<Figure, CensusError> {
    let mut trace = Trace::histogram(values(census, "n_users")?).named("Users per DAO");
    trace.xbins = Some(Bins { size: 5.0 });

    let mut figure = Figure::with_traces(vec![trace]);
    let log_axis = || Axis {
        kind: Some("log".to_string()),
        ..Axis::default()
    };
    figure.layout.xaxis = Some(log_axis());
    figure.layout.yaxis = Some(log_axis());
    figure.layout.legend = Some(top_legend(1.15));
    Ok(figure)
}

/// Histograms of users, proposals, votes and stakes per DAO.
pub fn distributions(census: &Table) -> Result<Vec<Figure>, CensusError> {
    let histograms = [
        ("n_users", "Users", 50),
        ("n_proposals", "Proposals", 50),
        ("n_votes", "Votes", 100),
        ("n_stakes", "Stakes", 20),
    ];

    histograms
        .iter()
        .map(|(column, label, bins)| {
            let mut trace = Trace::histogram(values(census, column)?).named(label);
            trace.nbinsx = Some(*bins);

            let mut figure = Figure::with_traces(vec![trace]);
            figure.layout.xaxis = Some(Axis::titled(label));
            figure.layout.yaxis = Some(Axis::titled("count"));
            Ok(figure)
        })
        .collect()
}

fn with_total(census: &Table, column: &str) -> Result<Table, CensusError> {
    let mut table = census.clone();
    for token in ["ETH", "GEN", "otherTokens"] {
        table.require_column(token)?;
    }
    table.derive_column(column, |row| {
        Cell::Float(
            ["ETH", "GEN", "otherTokens"]
                .iter()
                .map(|c| row.f64(c).unwrap_or(0.0))
                .sum(),
        )
    });
    table.sort_by_f64(column)?;
    Ok(table)
}

/// Stacked holdings per DAO, smallest first.
pub fn holdings(census: &Table) -> Result<Figure, CensusError> {
    let table = with_total(census, "holdings")?;
    let names = values(&table, "name")?;

    let mut figure = Figure::with_traces(vec![
        Trace::bar(names.clone(), values(&table, "ETH")?).named("ETH (USD)"),
        Trace::bar(names.clone(), values(&table, "GEN")?).named("GEN (USD)"),
        Trace::bar(names, values(&table, "otherTokens")?).named("Other criptos (USD)"),
    ]);
    figure.layout.barmode = Some("stack".to_string());
    Ok(figure)
}

/// Stacked budget of the DAOs in a [`crate::analysis::budget_table`].
pub fn budget(table: &Table) -> Result<Figure, CensusError> {
    let names = values(table, "name")?;

    let mut figure = Figure::with_traces(vec![
        Trace::bar(names.clone(), values(table, "GEN")?).named("GEN"),
        Trace::bar(names.clone(), values(table, "ETH")?).named("ETH"),
        Trace::bar(names, values(table, "otherTokens")?).named("Other criptos"),
    ]);
    figure.layout.barmode = Some("stack".to_string());
    figure.layout.xaxis = Some(name_axis());
    figure.layout.yaxis = Some(Axis {
        tick0: Some(0.0),
        dtick: Some(1000.0),
        ticksuffix: Some("$".to_string()),
        ..gridded(framed_axis())
    });
    figure.layout.plot_bgcolor = Some("white".to_string());
    figure.layout.legend = Some(Legend {
        x: Some(0.01),
        y: Some(0.98),
        font: Some(Font {
            size: Some(12.0),
            color: Some("black".to_string()),
        }),
        bordercolor: Some("Black".to_string()),
        borderwidth: Some(1.0),
        ..Legend::default()
    });
    Ok(figure)
}

/// Months with activity against the DAO's lifetime, from
/// [`crate::analysis::month_activity`].
pub fn activity_months(month_activity: &Table) -> Result<Figure, CensusError> {
    let mut table = month_activity.clone();
    table.sort_by_f64("activityMonths")?;
    let names = values(&table, "name")?;

    let mut figure = Figure::with_traces(vec![
        Trace::bar(names.clone(), values(&table, "activityMonths")?)
            .named("Real month activity")
            .with_marker(Marker {
                color: Some(LIGHT_BLUE.into()),
                ..Marker::default()
            }),
        Trace::scatter(names, values(&table, "monthLife")?)
            .named("Max months which can get activity")
            .with_marker(Marker {
                color: Some("black".into()),
                symbol: Some("x-thin-open".to_string()),
                ..Marker::default()
            }),
    ]);
    figure.layout.xaxis = Some(gridded(name_axis()));
    figure.layout.yaxis = Some(gridded(framed_axis()));
    figure.layout.plot_bgcolor = Some("white".to_string());
    figure.layout.legend = Some(top_legend(1.2));
    Ok(figure)
}

/// Users against proposals, votes, stakes and holdings.
pub fn correlations(census: &Table) -> Result<Vec<Figure>, CensusError> {
    let table = with_total(census, "holdings")?;
    [
        ("n_proposals", "Proposals"),
        ("n_votes", "Votes"),
        ("n_stakes", "Stakes"),
        ("holdings", "Holdings (USD)"),
    ]
    .iter()
    .map(|(column, title)| correlation(&table, "n_users", column, "Users", title))
    .collect()
}

fn excluding(table: &Table, column: &str, names: &[&str]) -> Table {
    table.filter(|row| !names.contains(&row.text(column).as_str()))
}

/// Users against the share of staked proposals, from a
/// [`crate::analysis::boost_data`] table.
pub fn boosting_correlation(boost: &Table) -> Result<Figure, CensusError> {
    let table = excluding(boost, "daoName", &BOOSTING_EXCLUDED);
    correlation(&table, "n_users", "stakePercentage", "Users", "Staked proposals %")
}

/// Boosting prediction accuracy per DAO, split at the median number of users.
///
/// `table` comes from [`crate::analysis::prediction_accuracy`].
pub fn prediction_rate(table: &Table) -> Result<Figure, CensusError> {
    // median over every DAO, excluded ones included
    let median = quantile(&table.column_f64("n_users")?, 0.5).unwrap_or(0.0);
    let mut daos = excluding(table, "name", &PREDICTION_EXCLUDED);
    daos.sort_by_f64("n_users")?;

    let half = |small: bool| -> Result<Trace, CensusError> {
        let part = daos.filter(|row| {
            let users = row.f64("n_users").unwrap_or(0.0);
            (users <= median) == small
        });
        Ok(Trace::scatter(values(&part, "name")?, values(&part, "accuracy")?)
            .with_marker(Marker {
                color: Some(Color::PerPoint(part.column_text("color")?)),
                size: Some(12.0),
                ..Marker::default()
            })
            .hide_legend())
    };

    let mut figure = Figure::with_traces(vec![half(true)?, half(false)?]);
    for (legend, color) in PROPOSAL_BUCKETS {
        figure.add_trace(Trace::legend_entry(legend, color));
    }

    figure.layout.shapes.push(Shape {
        kind: "line".to_string(),
        x0: json!(""),
        y0: json!(0),
        x1: json!(""),
        y1: json!(1),
        line: Some(Line {
            color: Some("black".to_string()),
            width: Some(3.0),
            dash: Some("dashdot".to_string()),
        }),
    });
    figure.layout.xaxis = Some(name_axis());
    figure.layout.yaxis = Some(Axis {
        nticks: Some(5),
        dtick: Some(0.2),
        ..gridded(framed_axis())
    });
    figure.layout.plot_bgcolor = Some("white".to_string());
    figure.layout.legend = Some(top_legend(1.2));
    Ok(figure)
}

/// Monthly actives from [`crate::analysis::monthly_actives`]; the latest month is
/// highlighted.
pub fn time_series(actives: &Table, title: &str) -> Result<Figure, CensusError> {
    let dates = values(actives, "date")?;
    let mut colors = vec![LIGHT_BLUE.to_string(); actives.len()];
    if let Some(last) = colors.last_mut() {
        *last = DARK_BLUE.to_string();
    }

    let mut figure = Figure::with_traces(vec![Trace::bar(dates.clone(), values(actives, "actives")?)
        .with_marker(Marker {
            color: Some(colors.into()),
            ..Marker::default()
        })]);
    figure.layout.xaxis = Some(Axis {
        kind: Some("date".to_string()),
        tickvals: Some(dates),
        tickformat: Some(DATE_FORMAT.to_string()),
        tickangle: Some(45.0),
        ..Axis::default()
    });
    figure.layout.yaxis = Some(Axis::titled(title));
    figure.layout.plot_bgcolor = Some("white".to_string());
    Ok(figure)
}
