use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, FilterColumn};

/// Skipped-row reasons listed in the top-bar tooltip.
const SKIPPED_ROWS_SHOWN: usize = 10;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(selection)) = (state.dataset.clone(), state.selection.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Year");
            egui::ComboBox::from_id_salt("year")
                .selected_text(selection.year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &dataset.years {
                        if ui
                            .selectable_label(selection.year == year, year.to_string())
                            .clicked()
                        {
                            state.set_year(year);
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Date range ----
            ui.strong("Date range");
            let mut start = selection.start;
            let mut end = selection.end;
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut start).id_salt("range_start"));
                ui.end_row();
                ui.label("To");
                ui.add(DatePickerButton::new(&mut end).id_salt("range_end"));
                ui.end_row();
            });
            if start != selection.start || end != selection.end {
                state.set_date_range(start, end);
            }
            if start > end {
                ui.label(
                    RichText::new("Start is after end; showing the whole year.")
                        .color(Color32::YELLOW)
                        .small(),
                );
            }
            ui.separator();

            // ---- Multi-selects ----
            multi_select(ui, state, FilterColumn::Region, "Regions", "none selected: no rows");
            multi_select(ui, state, FilterColumn::Category, "Categories", "none selected: all");
            multi_select(
                ui,
                state,
                FilterColumn::SubCategory,
                "Sub-categories",
                "none selected: all",
            );

            if let Some(notice) = state.notice.clone() {
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    ui.label(RichText::new(notice).color(Color32::YELLOW).small());
                    if ui.small_button("OK").clicked() {
                        state.notice = None;
                    }
                });
            }
        });
}

/// One collapsible checkbox list with All/None buttons.
fn multi_select(ui: &mut Ui, state: &mut AppState, column: FilterColumn, title: &str, hint: &str) {
    let options = state.options(column);
    let selected = state
        .selection
        .as_ref()
        .map(|s| s.selected(column).clone())
        .unwrap_or_default();

    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(column == FilterColumn::Region)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(column);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(column);
                }
                ui.label(RichText::new(hint).weak().small());
            });

            for value in &options {
                let mut text = RichText::new(value);
                if column == FilterColumn::Region {
                    text = text.color(state.region_colors.color_for(value));
                }

                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(column, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.view.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.view.as_ref().map_or(0, |v| v.row_count());
            ui.label(format!("{} rows loaded, {visible} visible", ds.len()));

            if ds.skipped_count() > 0 {
                let details: Vec<String> = ds
                    .skipped
                    .iter()
                    .take(SKIPPED_ROWS_SHOWN)
                    .map(|s| format!("line {}: {}", s.line, s.error))
                    .collect();
                ui.label(
                    RichText::new(format!("⚠ {} rows skipped", ds.skipped_count()))
                        .color(Color32::YELLOW),
                )
                .on_hover_text(details.join("\n"));
            }
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "txt", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match state.open_path(&path) {
            Ok(()) => log::info!("Opened {}", path.display()),
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("sales_summary.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };

    let result = view
        .to_json()
        .map_err(anyhow::Error::from)
        .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
    match result {
        Ok(()) => {
            log::info!("Exported summary to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export summary: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}
