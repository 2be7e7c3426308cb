use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::view::PREVIEW_ROWS;
use crate::state::AppState;
use crate::ui::format::format_amount;

// ---------------------------------------------------------------------------
// Home tab – headline metrics and the raw filtered rows
// ---------------------------------------------------------------------------

pub fn home_tab(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view sales  (File → Open…)");
        });
        return;
    };

    let regions: Vec<&str> = view.criteria.regions.iter().map(String::as_str).collect();
    ui.heading(format!(
        "Year: {} | Regions: {}",
        view.criteria.year,
        regions.join(", ")
    ));
    ui.label(
        RichText::new(format!("{} to {}", view.range.start, view.range.end)).weak(),
    );
    ui.add_space(8.0);

    let m = &view.metrics;
    ui.columns(3, |cols| {
        metric_card(&mut cols[0], "Total Sales", format_amount(m.total_sales));
        metric_card(&mut cols[1], "Total Orders", m.total_orders.to_string());
        metric_card(&mut cols[2], "Avg Order Value", format_amount(m.average_order_value));
    });
    ui.add_space(8.0);

    let shown = view.row_count().min(PREVIEW_ROWS);
    egui::CollapsingHeader::new(format!(
        "View Filtered Data ({shown} of {} rows)",
        view.row_count()
    ))
    .id_salt("filtered_rows")
    .show(ui, |ui: &mut Ui| {
        ScrollArea::both().auto_shrink([false, true]).show(ui, |ui: &mut Ui| {
            egui::Grid::new("filtered_rows_grid")
                .striped(true)
                .num_columns(9)
                .show(ui, |ui: &mut Ui| {
                    for title in [
                        "Order ID",
                        "Order Date",
                        "Ship Date",
                        "Customer",
                        "Region",
                        "Category",
                        "Sub-Category",
                        "Product Name",
                        "Sales",
                    ] {
                        ui.strong(title);
                    }
                    ui.end_row();

                    for rec in view.preview(dataset) {
                        ui.label(rec.order_id.as_str());
                        ui.label(rec.order_date.format("%m/%d/%Y").to_string());
                        ui.label(rec.ship_date.format("%m/%d/%Y").to_string());
                        ui.label(rec.customer_name.as_deref().unwrap_or(""));
                        ui.label(rec.region.as_str());
                        ui.label(rec.category.as_str());
                        ui.label(rec.sub_category.as_str());
                        ui.label(rec.product_name.as_str());
                        ui.label(format_amount(rec.sales));
                        ui.end_row();
                    }
                });
        });
    });
}

fn metric_card(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).weak());
            ui.label(RichText::new(value).size(24.0).strong());
        });
    });
}
