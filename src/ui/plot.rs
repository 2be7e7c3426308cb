use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::data::model::CalendarMonth;
use crate::state::AppState;
use crate::ui::format::{format_amount, format_share};

/// Bar colour for the product ranking (sky blue).
const BAR_COLOR: Color32 = Color32::from_rgb(135, 206, 235);

/// Radians per pie triangle.
const PIE_STEP: f32 = 0.05;

fn no_data(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(message);
    });
}

/// Axis label for a month ordinal; blank between whole months.
fn month_label(x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 {
        return String::new();
    }
    CalendarMonth::from_ordinal(x.round() as i64).to_string()
}

// ---------------------------------------------------------------------------
// Monthly sales trend
// ---------------------------------------------------------------------------

pub fn monthly_sales_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        no_data(ui, "Open a file to view sales  (File → Open…)");
        return;
    };

    ui.heading(format!("Monthly Sales Trend for {}", view.period_label()));
    if view.monthly_sales.is_empty() {
        no_data(ui, "No sales match the current filters.");
        return;
    }

    let points: Vec<[f64; 2]> = view
        .monthly_sales
        .iter()
        .map(|m| [m.month.ordinal() as f64, m.sales])
        .collect();

    Plot::new("monthly_sales")
        .x_axis_label("Year-Month")
        .y_axis_label("Total Sales")
        .x_axis_formatter(|mark, _range| month_label(mark.value))
        .label_formatter(|_name, value| {
            format!("{}\n{}", month_label(value.x.round()), format_amount(value.y))
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Sales")
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).name("Sales"));
        });
}

// ---------------------------------------------------------------------------
// Top products
// ---------------------------------------------------------------------------

pub fn top_products_chart(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        no_data(ui, "Open a file to view sales  (File → Open…)");
        return;
    };

    ui.heading(format!("Top {} Products by Sales", view.top_products.len()));
    if view.top_products.is_empty() {
        no_data(ui, "No sales match the current filters.");
        return;
    }

    // Best seller on top: rank 0 gets the highest y position.
    let n = view.top_products.len();
    let labels: Vec<String> = view
        .top_products
        .iter()
        .rev()
        .map(|p| p.short_name.clone())
        .collect();
    let bars: Vec<Bar> = view
        .top_products
        .iter()
        .enumerate()
        .map(|(rank, p)| {
            Bar::new((n - 1 - rank) as f64, p.sales)
                .name(&p.product_name)
                .fill(BAR_COLOR)
                .width(0.6)
        })
        .collect();

    Plot::new("top_products")
        .x_axis_label("Total Sales")
        .y_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if (v - v.round()).abs() > 1e-6 || v < 0.0 {
                return String::new();
            }
            labels.get(v.round() as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Sales"));
        });
}

// ---------------------------------------------------------------------------
// Sales by region
// ---------------------------------------------------------------------------

pub fn region_breakdown(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        no_data(ui, "Open a file to view sales  (File → Open…)");
        return;
    };

    ui.heading("Sales by Region");
    if view.region_sales.is_empty() {
        no_data(ui, "No sales match the current filters.");
        return;
    }

    let slices: Vec<(String, f32, Color32)> = view
        .region_sales
        .iter()
        .map(|r| {
            (
                format!("{}\n{}", r.region, format_share(r.share)),
                r.share as f32,
                state.region_colors.color_for(&r.region),
            )
        })
        .collect();

    ui.columns(2, |cols| {
        pie_chart(&mut cols[0], &slices);

        egui::Grid::new("region_table")
            .striped(true)
            .num_columns(3)
            .show(&mut cols[1], |ui: &mut Ui| {
                ui.strong("Region");
                ui.strong("Sales");
                ui.strong("Share");
                ui.end_row();
                for r in &view.region_sales {
                    ui.label(r.region.as_str());
                    ui.label(format_amount(r.sales));
                    ui.label(format_share(r.share));
                    ui.end_row();
                }
            });
    });
}

/// Draw a pie starting at 12 o'clock and running counter-clockwise.
fn pie_chart(ui: &mut Ui, slices: &[(String, f32, Color32)]) {
    let side = ui.available_width().min(360.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
    let center = response.rect.center();
    let radius = side * 0.35;
    let at = |angle: f32, r: f32| Pos2::new(center.x + r * angle.cos(), center.y - r * angle.sin());

    let mut angle = FRAC_PI_2;
    for (label, share, color) in slices {
        let sweep = share * TAU;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / PIE_STEP).ceil() as usize).max(1);
        for k in 0..steps {
            let a0 = angle + sweep * k as f32 / steps as f32;
            let a1 = angle + sweep * (k + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![center, at(a0, radius), at(a1, radius)],
                *color,
                Stroke::NONE,
            ));
        }

        let mid = angle + sweep / 2.0;
        painter.text(
            at(mid, radius * 1.25),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
        angle += sweep;
    }
}
