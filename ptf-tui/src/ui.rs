use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Entry, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("ptf – public toilet finder")
        .block(Block::default().borders(Borders::ALL).title("ptf"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::LayerSelect => draw_layer_select(frame, app, *content_area),
        Screen::FeatureList => draw_feature_list(frame, app, *content_area),
        Screen::FeatureDetail => draw_feature_detail(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::LayerSelect => "↑/↓ move · Enter/Space open layer · q/Ctrl-C quit",
        Screen::FeatureList => {
            "Type to filter · ↑/↓ move · Enter/→ details · Ctrl-R reload · Esc/← back · Ctrl-C quit"
        }
        Screen::FeatureDetail => "Esc/←/b back to list · Ctrl-R reload · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_layer_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.layers.is_empty() {
        vec![ListItem::new("No layers configured.")]
    } else {
        app.layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| {
                let prefix = if idx == app.layer_list_index {
                    "> "
                } else {
                    "  "
                };
                ListItem::new(format!("{prefix}{} ({})", layer.title, layer.type_name))
            })
            .collect::<Vec<ListItem<'_>>>()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select layer (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.layers.is_empty() {
        state.select(Some(app.layer_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_feature_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // filter
            Constraint::Min(0),    // features
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, results_area] = chunks else {
        return;
    };

    let layer_title = app
        .layers
        .get(app.layer_list_index)
        .map_or("<no layer>", |layer| layer.title.as_str());

    let input = Paragraph::new(app.filter_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Filter {layer_title}")),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let visible = app.visible_entries();
    let items = if app.is_loading {
        vec![ListItem::new("Loading features…")]
    } else if visible.is_empty() {
        vec![ListItem::new("No features match.")]
    } else {
        visible
            .iter()
            .map(|entry| ListItem::new(entry_line(entry)))
            .collect()
    };

    let sort_hint = if app.near.is_some() {
        "nearest first"
    } else {
        "server order"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{} of {} features, {sort_hint}",
            visible.len(),
            app.entries.len()
        )))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.entry_list_index));
    }
    frame.render_stateful_widget(list, *results_area, &mut state);
}

fn draw_feature_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(entry) = app.selected_entry.as_ref() else {
        let paragraph = Paragraph::new("No feature selected.")
            .block(Block::default().borders(Borders::ALL).title("Feature"));
        frame.render_widget(paragraph, area);
        return;
    };

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // location
            Constraint::Min(0),    // attributes
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [location_area, attributes_area] = chunks else {
        return;
    };

    let position = entry
        .feature
        .position
        .map_or_else(|| "no point geometry".to_owned(), |position| position.to_string());
    let distance = entry
        .distance_m
        .map_or_else(|| "–".to_owned(), format_distance);
    let map_url = app.map_url.as_deref().unwrap_or("–");

    let location = Paragraph::new(vec![
        Line::from(format!("Position: {position}")),
        Line::from(format!("Distance: {distance}")),
        Line::from(format!("Map:      {map_url}")),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", entry.label, entry.feature.id.0)),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(location, *location_area);

    let rows = entry.feature.properties.keys().map(|key| {
        let value = entry.feature.property_text(key).unwrap_or_default();
        Row::new(vec![Cell::from(key.clone()), Cell::from(value)])
    });

    let column_widths = [Constraint::Length(24), Constraint::Min(20)];
    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Attribute", "Value"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Attributes (Esc/←/b to go back)"),
        )
        .column_spacing(1);

    frame.render_widget(table, *attributes_area);
}

fn entry_line(entry: &Entry) -> String {
    match entry.distance_m {
        Some(distance) => format!("{:>9}  {}", format_distance(distance), entry.label),
        None => entry.label.clone(),
    }
}

fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{metres:.0} m")
    } else {
        format!("{:.1} km", metres / 1000.0)
    }
}
