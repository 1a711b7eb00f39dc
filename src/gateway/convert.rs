//! Conversion from serenity's model types to inbound events

use serenity::model::application::command::CommandOptionType;
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::application_command::{
    CommandData as SerenityCommandData, CommandDataOption,
};
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::{Attachment, Message};
use serenity::model::guild::{Member, PartialMember};
use serenity::model::user::User;

use crate::interaction::event::{
    AttachmentInfo, CommandData, ComponentData, EventKind, InboundEvent, MemberInfo, MessageEvent,
    ModalField, ModalSubmitData, RawOption, ResolvedData, UserInfo,
};

/// Raw wire code of an option type
pub fn option_code(kind: CommandOptionType) -> u8 {
    match kind {
        CommandOptionType::SubCommand => 1,
        CommandOptionType::SubCommandGroup => 2,
        CommandOptionType::String => 3,
        CommandOptionType::Integer => 4,
        CommandOptionType::Boolean => 5,
        CommandOptionType::User => 6,
        CommandOptionType::Channel => 7,
        CommandOptionType::Role => 8,
        CommandOptionType::Mentionable => 9,
        CommandOptionType::Number => 10,
        CommandOptionType::Attachment => 11,
        _ => 0,
    }
}

fn user_info(user: &User, member: Option<MemberInfo>) -> UserInfo {
    UserInfo {
        id: user.id.to_string(),
        name: user.name.clone(),
        bot: user.bot,
        member,
    }
}

fn member_info(member: &Member) -> MemberInfo {
    MemberInfo {
        nickname: member.nick.clone(),
        roles: member.roles.iter().map(|r| r.to_string()).collect(),
    }
}

fn partial_member_info(member: &PartialMember) -> MemberInfo {
    MemberInfo {
        nickname: member.nick.clone(),
        roles: member.roles.iter().map(|r| r.to_string()).collect(),
    }
}

fn attachment_info(attachment: &Attachment) -> AttachmentInfo {
    AttachmentInfo {
        id: attachment.id.to_string(),
        filename: attachment.filename.clone(),
        url: attachment.url.clone(),
        proxy_url: attachment.proxy_url.clone(),
        content_type: attachment.content_type.clone(),
        size: attachment.size,
    }
}

fn raw_option(option: &CommandDataOption) -> RawOption {
    RawOption {
        name: option.name.clone(),
        kind: option_code(option.kind),
        value: option.value.clone(),
        options: option.options.iter().map(raw_option).collect(),
        focused: option.focused,
    }
}

fn command_data(data: &SerenityCommandData) -> CommandData {
    let users = data
        .resolved
        .users
        .iter()
        .map(|(id, user)| {
            let member = data.resolved.members.get(id).map(partial_member_info);
            (id.to_string(), user_info(user, member))
        })
        .collect();
    let attachments = data
        .resolved
        .attachments
        .iter()
        .map(|(id, attachment)| (id.to_string(), attachment_info(attachment)))
        .collect();

    CommandData {
        name: data.name.clone(),
        options: data.options.iter().map(raw_option).collect(),
        resolved: ResolvedData { users, attachments },
    }
}

/// Convert a gateway interaction; pings and unknown kinds yield `None`
pub fn inbound_event(interaction: &Interaction) -> Option<InboundEvent> {
    let event = match interaction {
        Interaction::ApplicationCommand(command) => InboundEvent {
            id: command.id.to_string(),
            token: command.token.clone(),
            user: user_info(&command.user, command.member.as_ref().map(member_info)),
            guild_id: command.guild_id.map(|g| g.to_string()),
            channel_id: command.channel_id.to_string(),
            kind: EventKind::ApplicationCommand(command_data(&command.data)),
        },
        Interaction::Autocomplete(autocomplete) => InboundEvent {
            id: autocomplete.id.to_string(),
            token: autocomplete.token.clone(),
            user: user_info(
                &autocomplete.user,
                autocomplete.member.as_ref().map(member_info),
            ),
            guild_id: autocomplete.guild_id.map(|g| g.to_string()),
            channel_id: autocomplete.channel_id.to_string(),
            kind: EventKind::ApplicationCommandAutocomplete(command_data(&autocomplete.data)),
        },
        Interaction::MessageComponent(component) => InboundEvent {
            id: component.id.to_string(),
            token: component.token.clone(),
            user: user_info(&component.user, component.member.as_ref().map(member_info)),
            guild_id: component.guild_id.map(|g| g.to_string()),
            channel_id: component.channel_id.to_string(),
            kind: EventKind::MessageComponent(ComponentData {
                custom_id: component.data.custom_id.clone(),
                values: component.data.values.clone(),
                message_id: component.message.id.to_string(),
            }),
        },
        Interaction::ModalSubmit(modal) => InboundEvent {
            id: modal.id.to_string(),
            token: modal.token.clone(),
            user: user_info(&modal.user, modal.member.as_ref().map(member_info)),
            guild_id: modal.guild_id.map(|g| g.to_string()),
            channel_id: modal.channel_id.to_string(),
            kind: EventKind::ModalSubmit(ModalSubmitData {
                custom_id: modal.data.custom_id.clone(),
                fields: modal
                    .data
                    .components
                    .iter()
                    .flat_map(|row| row.components.iter())
                    .filter_map(|component| match component {
                        ActionRowComponent::InputText(input) => Some(ModalField {
                            custom_id: input.custom_id.clone(),
                            value: input.value.clone(),
                        }),
                        _ => None,
                    })
                    .collect(),
            }),
        },
        _ => return None,
    };
    Some(event)
}

pub fn message_event(message: &Message) -> MessageEvent {
    MessageEvent {
        id: message.id.to_string(),
        channel_id: message.channel_id.to_string(),
        guild_id: message.guild_id.map(|g| g.to_string()),
        author: user_info(
            &message.author,
            message.member.as_ref().map(partial_member_info),
        ),
        content: message.content.clone(),
    }
}
