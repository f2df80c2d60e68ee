//! Chat commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use tb_api::{ApiClient, PendingTarget};
use tb_core::config::BotConfig;
use tb_core::error::{BotError, BotResult};
use tb_models::{ChatAction, ChatMember, User};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ChatCommand {
    /// Show chat details.
    Info {
        /// Chat id.
        chat: String,
    },
    /// List chat administrators.
    Admins {
        /// Chat id.
        chat: String,
    },
    /// List chat members.
    Members {
        /// Chat id.
        chat: String,
        /// Fetch every page instead of only the first.
        #[arg(long)]
        all: bool,
    },
    /// List blocked users.
    Blocked {
        /// Chat id.
        chat: String,
    },
    /// List users waiting for join approval.
    Pending {
        /// Chat id.
        chat: String,
    },
    /// Approve or reject join requests.
    Resolve {
        /// Chat id.
        chat: String,
        /// User to resolve; omit together with --everyone.
        user: Option<String>,
        /// Resolve every pending request.
        #[arg(long, conflicts_with = "user")]
        everyone: bool,
        /// Reject instead of approve.
        #[arg(long)]
        reject: bool,
    },
    /// Set the chat title.
    Title {
        /// Chat id.
        chat: String,
        /// New title.
        title: String,
    },
    /// Set the chat description.
    About {
        /// Chat id.
        chat: String,
        /// New description.
        about: String,
    },
    /// Set the chat rules.
    Rules {
        /// Chat id.
        chat: String,
        /// New rules.
        rules: String,
    },
    /// Block a user in the chat.
    Block {
        /// Chat id.
        chat: String,
        /// User id.
        user: String,
        /// Also delete the user's latest messages.
        #[arg(long)]
        delete_messages: bool,
    },
    /// Unblock a user.
    Unblock {
        /// Chat id.
        chat: String,
        /// User id.
        user: String,
    },
    /// Show activity indicators (typing, looking). No actions clears them.
    Actions {
        /// Chat id.
        chat: String,
        /// Actions to show.
        actions: Vec<ChatAction>,
    },
}

pub async fn run(mut config: BotConfig, action: ChatCommand, format: OutputFormat) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;

    match action {
        ChatCommand::Info { chat } => {
            let info = api.get_chat_info(&chat).await?;
            match format {
                OutputFormat::Json => super::print_json(&info),
                OutputFormat::Text => {
                    println!(
                        "{} ({})",
                        style(info.display_name()).bold(),
                        info.chat_type
                    );
                    println!("  ID:          {}", info.chat_id);
                    if !info.nick.is_empty() {
                        println!("  Nick:        @{}", info.nick);
                    }
                    if !info.about.is_empty() {
                        println!("  About:       {}", super::one_line(&info.about, 60));
                    }
                    if !info.rules.is_empty() {
                        println!("  Rules:       {}", super::one_line(&info.rules, 60));
                    }
                    if !info.invite_link.is_empty() {
                        println!("  Invite link: {}", info.invite_link);
                    }
                    println!(
                        "  Public:      {}",
                        if info.public { "yes" } else { "no" }
                    );
                    if info.join_moderation {
                        println!("  Join:        {}", style("moderated").yellow());
                    }
                }
            }
        }
        ChatCommand::Admins { chat } => {
            let admins = api.get_chat_admins(&chat).await?;
            print_members(&admins, format);
        }
        ChatCommand::Members { chat, all } => {
            let members = if all {
                fetch_all_members(&api, &chat).await?
            } else {
                api.get_chat_members(&chat).await?
            };
            print_members(&members, format);
        }
        ChatCommand::Blocked { chat } => {
            let users = api.get_chat_blocked_users(&chat).await?;
            print_users(&users, "No blocked users.", format);
        }
        ChatCommand::Pending { chat } => {
            let users = api.get_chat_pending_users(&chat).await?;
            print_users(&users, "No pending users.", format);
        }
        ChatCommand::Resolve {
            chat,
            user,
            everyone,
            reject,
        } => {
            let target = match (user, everyone) {
                (_, true) => PendingTarget::Everyone,
                (Some(user), false) => PendingTarget::User(user),
                (None, false) => {
                    return Err(BotError::Usage("pass a user id or --everyone".into()));
                }
            };
            api.resolve_chat_pending(&chat, !reject, target).await?;
            super::print_ok(if reject { "rejected" } else { "approved" });
        }
        ChatCommand::Title { chat, title } => {
            api.set_chat_title(&chat, &title).await?;
            super::print_ok("title updated");
        }
        ChatCommand::About { chat, about } => {
            api.set_chat_about(&chat, &about).await?;
            super::print_ok("description updated");
        }
        ChatCommand::Rules { chat, rules } => {
            api.set_chat_rules(&chat, &rules).await?;
            super::print_ok("rules updated");
        }
        ChatCommand::Block {
            chat,
            user,
            delete_messages,
        } => {
            api.block_chat_user(&chat, &user, delete_messages).await?;
            super::print_ok(&format!("blocked {user}"));
        }
        ChatCommand::Unblock { chat, user } => {
            api.unblock_chat_user(&chat, &user).await?;
            super::print_ok(&format!("unblocked {user}"));
        }
        ChatCommand::Actions { chat, actions } => {
            api.send_chat_actions(&chat, &actions).await?;
            super::print_ok("actions sent");
        }
    }

    Ok(())
}

async fn fetch_all_members(api: &ApiClient, chat: &str) -> BotResult<Vec<ChatMember>> {
    let mut members = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = api.get_chat_members_page(chat, cursor.as_deref()).await?;
        members.extend(page.members);
        match page.cursor {
            Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                cursor = Some(next);
            }
            _ => return Ok(members),
        }
    }
}

fn print_members(members: &[ChatMember], format: OutputFormat) {
    match format {
        OutputFormat::Json => super::print_json(members),
        OutputFormat::Text => {
            if members.is_empty() {
                println!("No members found.");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["User ID", "Role"]);
            for member in members {
                let role = if member.creator {
                    "creator"
                } else if member.admin {
                    "admin"
                } else {
                    "-"
                };
                table.add_row(vec![member.user_id.as_str(), role]);
            }
            println!("{table}");
            println!("\n{} member(s)", members.len());
        }
    }
}

fn print_users(users: &[User], empty: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => super::print_json(users),
        OutputFormat::Text => {
            if users.is_empty() {
                println!("{empty}");
            }
            for user in users {
                println!("  {}", user.user_id);
            }
        }
    }
}
