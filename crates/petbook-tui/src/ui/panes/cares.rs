use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Cares);

    let Some(ref pet) = app.selected_pet else {
        let block = Block::default()
            .title(" Cuidados ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Seleccione una mascota y presione Enter",
                styles::muted_style(),
            )),
            Line::from(Span::styled("  para ver sus cuidados.", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    };

    let block = Block::default()
        .title(format!(" Cuidados de {} ({}) ", pet.name, app.cares.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.cares_loading && app.cares.is_empty() {
        let skeleton = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Cargando...", styles::muted_style())),
            Line::from(Span::styled("  ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(skeleton, area);
        return;
    }

    if let Some(ref error) = app.cares_error {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", error), styles::error_style())),
            Line::from(""),
            Line::from(Span::styled("  [r] reintentar", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    if app.cares.is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Sin cuidados programados.", styles::muted_style())),
            Line::from(Span::styled("  [c] agregar un cuidado", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let items: Vec<ListItem> = app
        .cares
        .iter()
        .enumerate()
        .map(|(i, care)| {
            let lines = vec![
                Line::from(vec![
                    Span::styled(format!("{:<22}", care.kind), styles::highlight_style()),
                    Span::styled(care.schedule_display(), styles::list_item_style()),
                ]),
                Line::from(Span::styled(
                    format!("  {}", care.description),
                    styles::muted_style(),
                )),
            ];

            let style = if i == app.care_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(lines).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.care_selection));
    frame.render_stateful_widget(list, area, &mut state);
}
