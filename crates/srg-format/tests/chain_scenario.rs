use pretty_assertions::assert_eq;
use srg_format::MappingsFormat;
use srg_mappings::{chain, Mappings, RenamingMappings};

const OBFUSCATED_TO_NAMED: &str = "
CL: aa Entity
CL: ab Cow
CL: ac EntityPlayer
CL: ad World
CL: ae Server
";

const MEMBERS: &str = "
CL: af ForgetfulClass
FD: Entity/a Entity/dead
MD: Cow/a (LCow;)V Cow/love (LCow;)V
MD: EntityPlayer/a (Ljava/lang/String;)V EntityPlayer/disconnect (Ljava/lang/String;)V
FD: World/a World/time
MD: World/a ()V World/tick ()V
FD: Server/a Server/ticks
MD: Server/a ()V Server/tick ()V
";

const SECOND_THOUGHTS: &str = "
CL: ForgetfulClass me/stupid/ChangedMind
FD: World/time World/numTicks
MD: World/tick ()V World/pulse ()V
";

const EXPECTED: &str = "
CL: aa net/minecraft/server/Entity
CL: ab net/minecraft/server/Cow
CL: ac net/minecraft/server/EntityPlayer
CL: ad net/minecraft/server/World
CL: ae net/minecraft/server/Server
CL: af me/stupid/ChangedMind
FD: aa/a net/minecraft/server/Entity/dead
MD: ab/a (Lab;)V net/minecraft/server/Cow/love (Lnet/minecraft/server/Cow;)V
MD: ac/a (Ljava/lang/String;)V net/minecraft/server/EntityPlayer/disconnect (Ljava/lang/String;)V
FD: ad/a net/minecraft/server/World/numTicks
MD: ad/a ()V net/minecraft/server/World/pulse ()V
FD: ae/a net/minecraft/server/Server/ticks
MD: ae/a ()V net/minecraft/server/Server/tick ()V
";

#[test]
fn chaining_parsed_layers_matches_expected_file() {
    let first = MappingsFormat::Srg.parse_str(OBFUSCATED_TO_NAMED).unwrap();
    let second = MappingsFormat::Srg.parse_str(MEMBERS).unwrap();
    let third = MappingsFormat::Srg.parse_str(SECOND_THOUGHTS).unwrap();
    let packages = RenamingMappings::packages([("", "net.minecraft.server")]);

    let layers: Vec<&dyn Mappings> = vec![&first, &second, &third, &packages];
    let chained = chain(layers).unwrap();
    let expected = MappingsFormat::Srg.parse_str(EXPECTED).unwrap();
    assert_eq!(chained, expected);
}

#[test]
fn chained_result_survives_both_formats() {
    let first = MappingsFormat::Srg.parse_str(OBFUSCATED_TO_NAMED).unwrap();
    let second = MappingsFormat::Srg.parse_str(MEMBERS).unwrap();
    let layers: Vec<&dyn Mappings> = vec![&first, &second];
    let chained = chain(layers).unwrap();

    for format in MappingsFormat::ALL {
        let text = format.to_lines(&chained).join("\n");
        let parsed = format.parse_str(&text).unwrap();
        assert_eq!(parsed, chained, "{format}:\n{text}");
    }
}

#[test]
fn inverting_the_chain_maps_named_back_to_obfuscated() {
    let first = MappingsFormat::Srg.parse_str(OBFUSCATED_TO_NAMED).unwrap();
    let second = MappingsFormat::Srg.parse_str(MEMBERS).unwrap();
    let layers: Vec<&dyn Mappings> = vec![&first, &second];
    let inverse = chain(layers).unwrap().invert();

    let lines = MappingsFormat::Srg.to_lines(&inverse);
    assert!(lines.contains(&"CL: World ad".to_string()), "{lines:#?}");
    assert!(lines.contains(&"FD: World/time ad/a".to_string()), "{lines:#?}");
    assert!(
        lines.contains(&"MD: Cow/love (LCow;)V ab/a (Lab;)V".to_string()),
        "{lines:#?}"
    );
}
