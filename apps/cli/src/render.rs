//! Plain-text rendering of views

use gotasks_core::{MainView, Resumed, SettingView, TaskDetailView, View};

pub fn view(view: &View) {
    match view {
        View::Main(main) => main_view(main),
        View::TaskDetail(detail) => task_detail(detail),
        View::Setting(setting) => setting_view(setting),
        View::SignIn => println!("Not signed in. Type `signin` to start."),
    }
}

fn main_view(view: &MainView) {
    println!("== {} ==", view.title);

    if view.is_empty {
        println!("No tasks!");
        return;
    }

    for group in &view.groups {
        println!("\n{}", group.heading);
        for task in &group.tasks {
            let mark = if task.completed { "x" } else { " " };
            println!("  [{mark}] {}  ({})", task.title, task.id);
        }
    }
}

fn task_detail(view: &TaskDetailView) {
    match &view.task_id {
        Some(id) => println!("== Task {id} =="),
        None => println!("== New task =="),
    }
    println!("title: {}", view.form.title);
    println!("due:   {}", view.form.due_date);
    println!("notes: {}", view.form.notes);
}

fn setting_view(view: &SettingView) {
    println!("== Task lists ==");
    for list in &view.lists {
        let mark = if list.selected { "*" } else { " " };
        println!(" {mark} {}  ({})", list.title, list.id);
    }
}

pub fn resumed(outcome: &Resumed) {
    match outcome {
        Resumed::View(v) => view(v),
        Resumed::Response(_) => println!("Retried request completed."),
    }
}
