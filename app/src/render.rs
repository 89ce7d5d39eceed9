use todo_client::{AuthView, TodoListView, View};

/// Draw a view as plain text.
pub fn render(view: &View) -> String {
    match view {
        View::Auth(auth) => render_auth(auth),
        View::Todos(list) => render_todos(list),
    }
}

fn render_auth(view: &AuthView) -> String {
    let mut out = format!("== {} ==\n", view.title);
    if view.show_confirm_password {
        out.push_str("submit <email> <password> <confirm-password>\n");
        out.push_str("(type `login` to sign in instead)\n");
    } else {
        out.push_str("submit <email> <password>\n");
        out.push_str("(type `register` to create an account)\n");
    }
    if let Some(error) = &view.error {
        out.push_str(&format!("! {error}\n"));
    }
    out
}

fn render_todos(view: &TodoListView) -> String {
    let mut out = String::from("== Your Todos ==\n");
    if view.rows.is_empty() {
        out.push_str("(nothing yet, `add <title> | <description>`)\n");
    }
    for (i, row) in view.rows.iter().enumerate() {
        let mark = if row.completed { "x" } else { " " };
        out.push_str(&format!("{:>3}. [{mark}] {} - {}", i + 1, row.title, row.description));
        if row.show_save {
            out.push_str(&format!("  <editing: save {} <title> | <description>>", i + 1));
        }
        out.push_str(&format!("  ({})\n", row.toggle_label));
    }
    if !view.draft.title.is_empty() || !view.draft.description.is_empty() {
        out.push_str(&format!("new: {} | {}\n", view.draft.title, view.draft.description));
    }
    out
}
