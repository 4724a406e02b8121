use crate::{
    error::{BuildError, ConfigurationError},
    lookup::StructuralLookup,
    node::{Multiplicity, PropertyConfiguration, PropertyKind},
    pipeline::{BuildContext, shape},
};
use convschema_meta::TypeId;
use tracing::{debug, trace};

///
/// ForeignKeyPlan
///
/// Discovered relationship for one navigation, applied after every
/// navigation has been inspected.
///

struct ForeignKeyPlan {
    owner: TypeId,
    navigation: String,
    foreign_keys: Vec<String>,
    principal_keys: Vec<String>,
    required: bool,
}

/// Find the dependent properties behind every single-valued navigation on
/// an entity type.
pub(crate) fn discover_foreign_keys(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let mut plans = Vec::new();

    for node in ctx.registry.iter().filter(|n| n.is_entity()) {
        for navigation in node
            .properties
            .iter()
            .filter(|p| p.kind == PropertyKind::Navigation)
        {
            if let Some(plan) = plan_navigation(ctx, &node.id, navigation)? {
                plans.push(plan);
            }
        }
    }

    let discovered = plans.len();
    for plan in plans {
        trace!(
            ty = %plan.owner,
            navigation = %plan.navigation,
            foreign_keys = ?plan.foreign_keys,
            "foreign key discovered"
        );
        let Some(property) = ctx.registry.property_mut(&plan.owner, &plan.navigation) else {
            continue;
        };
        let Some(navigation) = &mut property.navigation else {
            continue;
        };

        navigation.foreign_keys = plan.foreign_keys;
        navigation.principal_keys = plan.principal_keys;
        if plan.required && navigation.multiplicity == Multiplicity::ZeroOrOne {
            navigation.multiplicity = Multiplicity::One;
        }
    }

    debug!(navigations = discovered, "discovered foreign keys");

    Ok(())
}

fn plan_navigation(
    ctx: &BuildContext<'_>,
    owner: &TypeId,
    navigation: &PropertyConfiguration,
) -> Result<Option<ForeignKeyPlan>, BuildError> {
    let Some(principal) = &navigation.target else {
        return Ok(None);
    };
    let Some((principal_level, key)) = ctx.registry.resolved_key(principal) else {
        trace!(ty = %owner, navigation = %navigation.name, "principal has no key");
        return Ok(None);
    };

    let principal_keys = key
        .properties
        .iter()
        .filter_map(|name| ctx.registry.find_property(&principal_level.id, name))
        .map(|(_, p)| p)
        .collect::<Vec<_>>();
    let principal_name = ctx
        .registry
        .get(principal)
        .map_or_else(|| principal.name().to_string(), |n| n.name.clone());

    let dependent = ctx.registry.all_properties(owner);

    let foreign_keys = match annotated_on_navigation(ctx, owner, navigation, &dependent)? {
        Some(found) => found,
        None => annotated_on_dependent(ctx, navigation, &dependent)
            .or_else(|| by_convention(navigation, &principal_name, &principal_keys, &dependent))
            .unwrap_or_default(),
    };
    if foreign_keys.is_empty() {
        return Ok(None);
    }

    Ok(Some(ForeignKeyPlan {
        owner: owner.clone(),
        navigation: navigation.name.clone(),
        required: !nullability_declared(ctx, owner, &navigation.member)
            && foreign_keys.iter().all(|p| !p.nullable),
        foreign_keys: foreign_keys.iter().map(|p| p.name.clone()).collect(),
        principal_keys: key.properties.clone(),
    }))
}

// An explicit nullability on the navigation is kept as declared.
fn nullability_declared(ctx: &BuildContext<'_>, owner: &TypeId, member: &str) -> bool {
    ctx.decls.types.get(owner).is_some_and(|decl| {
        decl.properties
            .iter()
            .any(|p| p.member == member && p.nullable.is_some())
    })
}

fn matches_name(property: &PropertyConfiguration, name: &str) -> bool {
    property.member == name || property.name == name
}

// `ForeignKey("A,B")` on the navigation names the dependent members.
fn annotated_on_navigation<'r>(
    ctx: &BuildContext<'_>,
    owner: &TypeId,
    navigation: &PropertyConfiguration,
    dependent: &[&'r PropertyConfiguration],
) -> Result<Option<Vec<&'r PropertyConfiguration>>, BuildError> {
    let Some(names) = shape::member_of(ctx.source, &navigation.declared_on, &navigation.member)
        .and_then(|m| m.foreign_key())
    else {
        return Ok(None);
    };

    let mut found = Vec::new();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let Some(property) = dependent.iter().find(|p| matches_name(p, name)) else {
            return Err(ConfigurationError::ForeignKeyNotFound {
                ty: owner.clone(),
                property: navigation.name.clone(),
                foreign_key: name.to_string(),
            }
            .into());
        };
        found.push(*property);
    }

    Ok(Some(found))
}

// `ForeignKey("Nav")` on dependent members names the navigation.
fn annotated_on_dependent<'r>(
    ctx: &BuildContext<'_>,
    navigation: &PropertyConfiguration,
    dependent: &[&'r PropertyConfiguration],
) -> Option<Vec<&'r PropertyConfiguration>> {
    let found = dependent
        .iter()
        .filter(|p| !p.kind.is_navigation())
        .filter(|p| {
            shape::member_of(ctx.source, &p.declared_on, &p.member)
                .and_then(|m| m.foreign_key())
                .is_some_and(|target| {
                    target == navigation.member || target == navigation.name
                })
        })
        .copied()
        .collect::<Vec<_>>();

    (!found.is_empty()).then_some(found)
}

// `<Navigation>Id` for a single-part principal key, otherwise
// `<PrincipalType><KeyMember>` for every key part.
fn by_convention<'r>(
    navigation: &PropertyConfiguration,
    principal_name: &str,
    principal_keys: &[&PropertyConfiguration],
    dependent: &[&'r PropertyConfiguration],
) -> Option<Vec<&'r PropertyConfiguration>> {
    let keyable = |name: &str| {
        dependent
            .iter()
            .find(|p| p.kind.is_keyable() && p.member.eq_ignore_ascii_case(name))
            .copied()
    };

    if principal_keys.len() == 1
        && let Some(found) = keyable(&format!("{}Id", navigation.member))
    {
        return Some(vec![found]);
    }

    principal_keys
        .iter()
        .map(|key| keyable(&format!("{principal_name}{}", key.member)))
        .collect::<Option<Vec<_>>>()
        .filter(|found| !found.is_empty())
}
