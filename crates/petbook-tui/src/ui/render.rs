use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, CareField, DeleteTarget, PetField, ToastKind};

use super::panes::{cares, pets};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Panes
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_panes(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Overlays
    match app.state {
        AppState::AddingPet => render_pet_form_overlay(frame, app),
        AppState::AddingCare => render_care_form_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::Browsing | AppState::Quitting => {}
    }

    render_toasts(frame, app);
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  petbook";
    let help_hint = format!("{}  [?] Ayuda", chrono::Local::now().format("%Y-%m-%d"));

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4) as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_panes(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    pets::render(frame, app, chunks[0]);
    cares::render(frame, app, chunks[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let loading = app.pets_loading || app.cares_loading;
    let hints = "[a] mascota  [c] cuidado  [d] eliminar  [r] refrescar  [Tab] panel  [q] salir";

    let mut spans = vec![Span::raw(" "), Span::styled(hints, styles::help_desc_style())];
    if loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Cargando...", styles::highlight_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Form overlays
// ============================================================================

/// One labeled input line, with a cursor on the focused field.
fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::styled(format!("  {:<22}", label), styles::help_desc_style()),
        Span::styled(format!("{}{}", value, cursor), value_style),
    ])
}

/// An enum field the user steps through with Left/Right.
fn choice_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let arrows = if focused { "◄ ► " } else { "    " };
    Line::from(vec![
        Span::styled(format!("  {:<22}", label), styles::help_desc_style()),
        Span::styled(arrows, styles::muted_style()),
        Span::styled(value.to_string(), value_style),
    ])
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", message), styles::error_style()))
}

fn render_pet_form_overlay(frame: &mut Frame, app: &App) {
    let form = &app.pet_form;
    let height = 16 + form.errors.len() as u16;
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Nueva Mascota", styles::title_style())),
        Line::from(""),
        field_line("Nombre *", &form.draft.name, form.focus == PetField::Name),
    ];
    if let Some(message) = form.error_for("nombre") {
        lines.push(error_line(message));
    }
    lines.push(choice_line(
        "Especie",
        form.draft.species.label(),
        form.focus == PetField::Species,
    ));
    lines.push(field_line("Raza *", &form.draft.breed, form.focus == PetField::Breed));
    if let Some(message) = form.error_for("raza") {
        lines.push(error_line(message));
    }
    lines.push(field_line(
        "Fecha de nacimiento *",
        &form.draft.birth_date,
        form.focus == PetField::BirthDate,
    ));
    lines.push(Line::from(Span::styled(
        "                        Formato YYYY-MM-DD",
        styles::muted_style(),
    )));
    if let Some(message) = form.error_for("fecha_nacimiento") {
        lines.push(error_line(message));
    }
    lines.push(choice_line("Sexo", form.draft.sex.label(), form.focus == PetField::Sex));
    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled("  Guardando...", styles::highlight_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  [Enter] ", styles::help_key_style()),
            Span::styled("guardar  ", styles::help_desc_style()),
            Span::styled("[Tab] ", styles::help_key_style()),
            Span::styled("campo  ", styles::help_desc_style()),
            Span::styled("[Esc] ", styles::help_key_style()),
            Span::styled("cancelar", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_care_form_overlay(frame: &mut Frame, app: &App) {
    let form = &app.care_form;
    let pet_name = app
        .selected_pet
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("");
    let height = if form.error.is_some() { 15 } else { 14 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  Nuevo cuidado para {}", pet_name),
            styles::title_style(),
        )),
        Line::from(""),
        choice_line("Tipo", form.draft.kind.label(), form.focus == CareField::Kind),
        field_line("Fecha *", &form.draft.date, form.focus == CareField::Date),
        Line::from(Span::styled(
            "                        Formato YYYY-MM-DD, desde mañana",
            styles::muted_style(),
        )),
        field_line("Hora *", &form.draft.time, form.focus == CareField::Time),
        Line::from(Span::styled(
            "                        Formato HH:MM",
            styles::muted_style(),
        )),
        field_line(
            "Descripcion *",
            &form.draft.description,
            form.focus == CareField::Description,
        ),
    ];
    if let Some(message) = form.error {
        lines.push(error_line(message));
    }
    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled("  Guardando...", styles::highlight_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  [Enter] ", styles::help_key_style()),
            Span::styled("agregar  ", styles::help_desc_style()),
            Span::styled("[Tab] ", styles::help_key_style()),
            Span::styled("campo  ", styles::help_desc_style()),
            Span::styled("[Esc] ", styles::help_key_style()),
            Span::styled("cancelar", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 6, frame.area());
    frame.render_widget(Clear, area);

    let prompt = match app.delete_target {
        Some(DeleteTarget::Pet { ref name, .. }) => format!("¿Eliminar a {}?", name),
        Some(DeleteTarget::Care { .. }) => "¿Eliminar este cuidado?".to_string(),
        None => "¿Eliminar?".to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", prompt), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [y] ", styles::help_key_style()),
            Span::styled("si   ", styles::help_desc_style()),
            Span::styled("[n] ", styles::help_key_style()),
            Span::styled("no", styles::help_desc_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::error_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 16, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let key = styles::help_key_style();
    let desc = styles::help_desc_style();
    let lines = vec![
        Line::from(Span::styled("  petbook", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navegacion", styles::highlight_style())),
        Line::from(vec![Span::styled("  ↑/↓       ", key), Span::styled("Mover seleccion", desc)]),
        Line::from(vec![Span::styled("  Tab       ", key), Span::styled("Cambiar de panel", desc)]),
        Line::from(vec![Span::styled("  Enter     ", key), Span::styled("Ver/ocultar cuidados", desc)]),
        Line::from(""),
        Line::from(Span::styled(" Acciones", styles::highlight_style())),
        Line::from(vec![Span::styled("  a         ", key), Span::styled("Nueva mascota", desc)]),
        Line::from(vec![Span::styled("  c         ", key), Span::styled("Nuevo cuidado", desc)]),
        Line::from(vec![Span::styled("  d         ", key), Span::styled("Eliminar seleccion", desc)]),
        Line::from(vec![Span::styled("  r         ", key), Span::styled("Refrescar datos", desc)]),
        Line::from(vec![Span::styled("  q         ", key), Span::styled("Salir", desc)]),
        Line::from(""),
        Line::from(Span::styled("  [Esc] cerrar", styles::muted_style())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Toasts
// ============================================================================

/// Bottom-right stack, newest at the bottom.
fn render_toasts(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    if screen.height < 4 || screen.width < 8 {
        return;
    }
    let mut bottom = screen.y + screen.height.saturating_sub(3);

    for toast in app.toasts.iter().rev() {
        let width = (toast.message.chars().count() as u16 + 4).min(screen.width);
        let area = Rect {
            x: screen.x + screen.width.saturating_sub(width + 2),
            y: bottom,
            width,
            height: 1,
        };
        frame.render_widget(Clear, area);
        let line = Line::from(Span::raw(format!("  {}  ", toast.message)));
        let style = styles::toast_style(toast.kind == ToastKind::Error);
        frame.render_widget(Paragraph::new(line).style(style), area);

        if bottom <= screen.y + 1 {
            break;
        }
        bottom -= 2;
    }
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}
