use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};
use serenity::model::permissions::Permissions;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use interaction_router::{
    Button, ButtonStyle, Choice, CommandGroup, CommandOption, ComponentEmoji, Config, Framework,
    MessagePayload, Modal, ModalInput, OptionKind, Select, SelectOption, SlashCommand,
    TextInputStyle,
};

const GREETINGS: [&str; 4] = ["hello", "hey there", "good morning", "greetings"];

fn test_group() -> CommandGroup {
    let subsubtest = SlashCommand::new(
        "subsubtest",
        "Replies with whatever you typed",
        |ctx, args| async move {
            ctx.acknowledge().await?;
            let said = args
                .first()
                .and_then(|a| a.as_str())
                .unwrap_or("nothing")
                .to_string();
            ctx.edit(format!("Hello! You said {said}")).await?;
            Ok(())
        },
    )
    .option(CommandOption::new(
        "message",
        "What to say",
        OptionKind::String,
        true,
    ));

    let ephemeral = SlashCommand::new("ephemeral", "A reply only you can see", |ctx, _args| {
        async move {
            ctx.respond(format!("Only {} can read this", ctx.user().display_name()))
                .await?;
            Ok(())
        }
    });

    CommandGroup::new("test", "Reply flow checks")
        .child(CommandGroup::new("subtest", "Nested commands").child(subsubtest))
        .child(ephemeral)
}

fn ping_command() -> SlashCommand {
    SlashCommand::new("ping", "Echo a greeting back", |ctx, args| async move {
        let greeting = args
            .first()
            .and_then(|a| a.as_str())
            .unwrap_or("pong")
            .to_string();
        let payload = MessagePayload::text(greeting).row([Button::new(
            "Click me",
            ButtonStyle::Primary,
        )
        .emoji(ComponentEmoji::unicode("👋"))
        .route("click", ctx.user().id.clone())]);
        ctx.respond(payload).await?;
        Ok(())
    })
    .option(
        CommandOption::new("greeting", "What to echo", OptionKind::String, true).autocomplete(
            |_ctx, typed| async move {
                let typed = typed.as_str().unwrap_or_default().to_lowercase();
                let mut choices: Vec<Choice> = GREETINGS
                    .iter()
                    .filter(|g| g.starts_with(typed.as_str()))
                    .map(|g| Choice::new(*g, *g))
                    .collect();
                if !typed.is_empty() && !GREETINGS.contains(&typed.as_str()) {
                    choices.insert(0, Choice::new(typed.clone(), typed));
                }
                choices
            },
        ),
    )
}

fn color_command() -> SlashCommand {
    SlashCommand::new("color", "Pick your favourite colours", |ctx, _args| async move {
        let menu = Select::new("Choose colours")
            .option(SelectOption::new("Red", "red").emoji(ComponentEmoji::unicode("🟥")))
            .option(SelectOption::new("Green", "green").emoji(ComponentEmoji::unicode("🟩")))
            .option(SelectOption::new("Blue", "blue").emoji(ComponentEmoji::unicode("🟦")))
            .range(1, 3)
            .route("colors", "");
        ctx.respond(MessagePayload::text("Which colours do you like?").row([menu]))
            .await?;
        Ok(())
    })
}

fn feedback_command() -> SlashCommand {
    SlashCommand::new("feedback", "Send feedback through a form", |ctx, _args| async move {
        let form = Modal::new("Feedback", |ctx, values| async move {
            let subject = values.first().cloned().unwrap_or_default();
            let body = values.get(1).cloned().unwrap_or_default();
            info!("📝 Feedback from {}: {subject}", ctx.user().name);
            ctx.respond(format!("Thanks! Got **{subject}** ({} chars)", body.len()))
                .await?;
            Ok(())
        })
        .input(ModalInput::new("Subject", TextInputStyle::Short).length(1, 80))
        .input(
            ModalInput::new("Details", TextInputStyle::Paragraph)
                .placeholder("Tell us more")
                .optional(),
        );
        ctx.modal(form).await?;
        Ok(())
    })
}

fn counter_command() -> SlashCommand {
    SlashCommand::new("counter", "A counter living on its message", |ctx, _args| {
        async move {
            let count = Arc::new(AtomicU32::new(0));
            let increment = {
                let count = count.clone();
                Button::new("+1", ButtonStyle::Success).on_click(move |ctx| {
                    let count = count.clone();
                    async move {
                        let value = count.fetch_add(1, Ordering::SeqCst) + 1;
                        ctx.respond(format!("Count: {value}")).await?;
                        Ok(())
                    }
                })
            };
            let reset = Button::new("Done", ButtonStyle::Secondary).on_click(move |ctx| {
                let count = count.clone();
                async move {
                    let value = count.load(Ordering::SeqCst);
                    ctx.respond(MessagePayload::text(format!("Final count: {value}")).clear_components())
                        .await?;
                    Ok(())
                }
            });
            ctx.respond(MessagePayload::text("Count: 0").row([increment, reset]))
                .await?;
            Ok(())
        }
    })
}

fn admin_command() -> SlashCommand {
    SlashCommand::new("purge-cache", "Drop cached state (admins only)", |ctx, _args| {
        async move {
            ctx.respond("Nothing cached yet").await?;
            Ok(())
        }
    })
    .require_permissions(Permissions::MANAGE_GUILD)
}

fn build_framework() -> Result<Framework> {
    let mut framework = Framework::new();

    framework.register_command(test_group())?;
    framework.register_command(ping_command())?;
    framework.register_command(color_command())?;
    framework.register_command(feedback_command())?;
    framework.register_command(counter_command())?;
    framework.register_command(admin_command())?;

    framework.add_button_handler("click", |ctx, owner| async move {
        if ctx.user().id != owner {
            ctx.acknowledge().await?;
            ctx.respond("That button isn't yours").await?;
            return Ok(());
        }
        ctx.respond(MessagePayload::text("Clicked!").clear_components())
            .await?;
        Ok(())
    })?;

    framework.add_select_handler("colors", |ctx, _params, values| async move {
        ctx.respond(format!("You picked: {}", values.join(", ")))
            .await?;
        Ok(())
    })?;

    framework.add_middleware(|ctx, target| async move {
        info!("[{}] ⚡ {} invoked {target}", ctx.id(), ctx.user().name);
        true
    });
    framework.add_middleware(|ctx, target| async move {
        if ctx.user().bot {
            warn!("[{}] 🚫 Ignoring {target} from bot account", ctx.id());
            return false;
        }
        true
    });

    framework.set_message_handler(|ctx| async move {
        if ctx.content().trim().eq_ignore_ascii_case("ping") {
            ctx.acknowledge().await?;
            ctx.respond("Pong!").await?;
        }
        Ok(())
    });

    Ok(framework)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting interaction router demo bot...");

    let framework = build_framework()?;
    let session = framework.start(&config).await?;

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutdown requested, closing gateway connection");
    session.stop().await?;

    Ok(())
}
