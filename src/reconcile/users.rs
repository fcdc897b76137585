// Pending-user approval: resolve each new forum user to a team by
// registration IP and grant group membership, approval, and activation.
//
// Users are processed independently — one user's failure logs and moves on.
// Team resolution is deliberately order-dependent: the first roster team
// whose subnet list contains the IP wins, since subnets are not guaranteed
// disjoint across teams.

use std::net::IpAddr;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::SyncContext;
use crate::error::ApiError;
use crate::forum::users::PendingUser;
use crate::scoring::client::Team;

/// Process every approvable pending user. Never fails the pass for a
/// single user; only the initial listings can abort it.
pub async fn process_new_users(ctx: &SyncContext) -> Result<()> {
    let pending = ctx.forum.pending_users().await?;
    let approvable: Vec<PendingUser> = pending.into_iter().filter(|u| u.can_approve).collect();

    if approvable.is_empty() {
        debug!("No users waiting for approval");
        return Ok(());
    }

    let roster = ctx.scoring.teams().await?;

    for user in &approvable {
        if let Err(e) = approve_user(ctx, &roster, user).await {
            warn!(user = %user.username, error = %e, "Failed to set up new user");
        }
    }

    Ok(())
}

async fn approve_user(ctx: &SyncContext, roster: &[Team], user: &PendingUser) -> Result<()> {
    // Only the full record carries the registration IP.
    let detail = ctx.forum.user(user.id).await?;

    let team = team_for_ip(roster, &detail.registration_ip_address)?;

    let groups = team.forum_groups();
    if groups.is_empty() {
        anyhow::bail!("Team {:?} has no forum tag", team.name);
    }

    for group_name in groups {
        let group = ctx.forum.find_group(group_name).await?.ok_or_else(|| {
            ApiError::Configuration(format!("User group doesn't exist: {group_name}"))
        })?;
        ctx.forum.add_group_member(group.id, &detail.username).await?;
    }

    ctx.forum.approve_user(detail.id).await?;
    // No e-mail round trip; accounts are activated directly.
    ctx.forum.activate_user(detail.id).await?;

    info!(user = %detail.username, team = %team.name, "Activated new user");
    Ok(())
}

/// Resolve an IP to the first roster team whose subnet list contains it.
///
/// Malformed subnet entries are logged and skipped — one team's typo must
/// not block other teams' users from matching.
pub fn team_for_ip<'a>(teams: &'a [Team], ip_str: &str) -> Result<&'a Team> {
    let ip: IpAddr = ip_str
        .parse()
        .with_context(|| format!("Bad IP {ip_str:?}"))?;

    for team in teams {
        for subnet in team.subnets.split(',') {
            let subnet = subnet.trim();
            if subnet.is_empty() {
                continue;
            }

            match parse_cidr(subnet) {
                Ok((net, prefix)) => {
                    if cidr_contains(net, prefix, ip) {
                        return Ok(team);
                    }
                }
                Err(e) => {
                    warn!(subnet, error = %e, "Bad team subnet");
                    continue;
                }
            }
        }
    }

    Err(ApiError::NotFound(format!("No team matches IP {ip_str}")).into())
}

/// Parse "addr/prefix" CIDR notation.
fn parse_cidr(raw: &str) -> Result<(IpAddr, u8)> {
    let (addr, prefix) = raw
        .split_once('/')
        .with_context(|| format!("Subnet {raw:?} is missing a /prefix"))?;

    let addr: IpAddr = addr
        .parse()
        .with_context(|| format!("Bad subnet address in {raw:?}"))?;
    let prefix: u8 = prefix
        .parse()
        .with_context(|| format!("Bad prefix length in {raw:?}"))?;

    let max = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if prefix > max {
        anyhow::bail!("Prefix length {prefix} out of range in {raw:?}");
    }

    Ok((addr, prefix))
}

/// Mask comparison. Mixed address families never match.
fn cidr_contains(net: IpAddr, prefix: u8, ip: IpAddr) -> bool {
    match (net, ip) {
        (IpAddr::V4(net), IpAddr::V4(ip)) => {
            let mask = if prefix == 0 {
                0
            } else {
                u32::MAX << (32 - u32::from(prefix))
            };
            (u32::from(net) & mask) == (u32::from(ip) & mask)
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) => {
            let mask = if prefix == 0 {
                0
            } else {
                u128::MAX << (128 - u32::from(prefix))
            };
            (u128::from(net) & mask) == (u128::from(ip) & mask)
        }
        _ => false,
    }
}
