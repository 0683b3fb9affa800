//! Interactive command loop

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use gotasks_core::{App, CoreError, MessageOutcome, RedirectMessage, Route, Startup, View};

use crate::launcher::ConsoleLauncher;
use crate::render;

const HELP: &str = "\
Commands:
  signin                 start the sign-in flow
  <redirect url>         finish a sign-in or renewal
  show                   redraw the current view
  go <#route>            open a route (#tasks, #taskDetail-<id>, #setting)
  task <id>              show one task
  add <title>            create a task
  rename <id> <title>    change a task's title
  due <id> <YYYY-MM-DD>  set a due date (`none` clears it)
  note <id> <text>       replace a task's notes
  done <id> | undone <id>
  clear                  hide completed tasks
  lists                  show task lists
  use <list id>          switch task list
  logout
  quit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run(app: &App, launcher: &ConsoleLauncher) -> anyhow::Result<()> {
    match app.startup().await {
        Ok(Startup::SignInRequired) => render::view(&View::SignIn),
        Ok(Startup::Refreshing) => {}
        Ok(Startup::Ready(view)) => render::view(&view),
        Err(e) => report(&e),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match handle(app, launcher, line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => report(&e),
        }
    }

    Ok(())
}

fn report(error: &CoreError) {
    if error.is_unauthorized() {
        println!("Access token rejected; the request will be retried once the session is renewed.");
    } else {
        eprintln!("error: {error}");
    }
}

async fn handle(app: &App, launcher: &ConsoleLauncher, line: &str) -> gotasks_core::Result<Flow> {
    if line.starts_with("http://") || line.starts_with("https://") {
        receive_redirect(app, launcher, line).await?;
        return Ok(Flow::Continue);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "help" | "?" => println!("{HELP}"),
        "quit" | "exit" => return Ok(Flow::Quit),
        "signin" => app.sign_in()?,
        "show" => render::view(&app.show_current().await?),
        "go" => match app.navigate_hash(rest).await? {
            Some(view) => render::view(&view),
            None => println!("Unknown route: {rest}"),
        },
        "tasks" => render::view(&app.navigate(Route::Main).await?),
        "task" => {
            let route = Route::TaskDetail(Some(rest.to_string()));
            render::view(&app.navigate(route).await?);
        }
        "add" => {
            let mut form = app.task_detail_view(None).await?.form;
            form.title = rest.to_string();
            render::view(&app.save_task(None, &form).await?);
        }
        "rename" | "due" | "note" => {
            let Some((id, value)) = rest.split_once(' ') else {
                println!("usage: {command} <id> <value>");
                return Ok(Flow::Continue);
            };
            let mut form = app.task_detail_view(Some(id)).await?.form;
            match command {
                "rename" => form.title = value.trim().to_string(),
                "due" if value.trim() == "none" => form.due_date.clear(),
                "due" => form.due_date = value.trim().to_string(),
                _ => form.notes = value.trim().to_string(),
            }
            render::view(&app.save_task(Some(id), &form).await?);
        }
        "done" | "undone" => {
            let form = app.task_detail_view(Some(rest)).await?.form;
            let etag = app.set_completed(rest, &form.etag, command == "done").await?;
            tracing::debug!(task_id = %rest, etag = %etag, "Completion updated");
            println!("ok");
        }
        "clear" => render::view(&app.clear_completed().await?),
        "lists" => render::view(&app.navigate(Route::Setting).await?),
        "use" => {
            app.select_task_list(rest)?;
            render::view(&app.navigate(Route::Main).await?);
        }
        "logout" => {
            app.logout()?;
            render::view(&View::SignIn);
        }
        _ => println!("Unknown command `{command}`, type `help`"),
    }

    Ok(Flow::Continue)
}

async fn receive_redirect(
    app: &App,
    launcher: &ConsoleLauncher,
    line: &str,
) -> gotasks_core::Result<()> {
    if !launcher.is_awaiting() {
        println!("No sign-in in progress.");
        return Ok(());
    }

    let url = Url::parse(line)?;
    let message = RedirectMessage::from_redirect_url(&url, launcher.redirect_source());
    // A retried call may start another renewal while this one is handled
    launcher.clear();

    match app.receive_message(message).await? {
        MessageOutcome::Ignored => println!("Redirect came from an unexpected origin."),
        MessageOutcome::SignedIn(view) => render::view(&view),
        MessageOutcome::Refreshed(outcomes) => {
            for outcome in outcomes {
                match outcome {
                    Ok(resumed) => render::resumed(&resumed),
                    Err(e) => report(&e),
                }
            }
        }
    }

    Ok(())
}
